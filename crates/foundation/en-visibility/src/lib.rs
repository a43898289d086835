//! Visibility classification for namespace bindings
//!
//! Every binding of a finalized namespace lands in one of three tiers:
//! - **Public**: listed and reachable from outside
//! - **Hidden**: reachable from outside, listed only on request
//! - **Private**: reachable only from inside the namespace
//!
//! The tier is derived either from the binding's name (a leading reserved
//! marker character) or, when the namespace declared a provide list, from
//! membership in that list alone. Classification is a pure function of its
//! inputs and knows nothing about how bindings are stored.

use indexmap::IndexSet;
use std::fmt;

/// Marker character used when no other convention is configured
pub const DEFAULT_MARKER: char = '.';

/// Visibility tier of a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Visibility {
    /// Listed and reachable from outside
    Public,
    /// Reachable from outside, listed only when hidden names are requested
    Hidden,
    /// Reachable only through internal access
    Private,
}

impl Visibility {
    /// Whether an external caller may read a binding of this tier
    #[must_use]
    pub const fn is_external(self) -> bool {
        matches!(self, Self::Public | Self::Hidden)
    }

    /// Whether a binding of this tier shows up in an external listing
    #[must_use]
    pub const fn is_listed(self, include_hidden: bool) -> bool {
        match self {
            Self::Public => true,
            Self::Hidden => include_hidden,
            Self::Private => false,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(formatter, "public"),
            Self::Hidden => write!(formatter, "hidden"),
            Self::Private => write!(formatter, "private"),
        }
    }
}

/// Explicit allow-list of public names
///
/// Once any name has been provided, naming conventions stop applying to the
/// namespace: listed names are public and everything else is private.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvideList {
    names: IndexSet<String>,
    declared: bool,
}

impl ProvideList {
    /// Create an empty, undeclared provide list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge names into the list and mark it declared
    ///
    /// Declaring an empty list still counts: it makes every binding private.
    pub fn extend<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declared = true;
        self.names.extend(names.into_iter().map(Into::into));
    }

    /// Whether a provide directive was seen
    #[must_use]
    pub const fn is_declared(&self) -> bool {
        self.declared
    }

    /// Whether `name` was provided
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Provided names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// Name-prefix convention for hidden and private bindings
///
/// One leading marker makes a name hidden, two make it private.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamingConvention {
    marker: char,
}

impl NamingConvention {
    /// Create a convention around `marker`
    #[must_use]
    pub const fn new(marker: char) -> Self {
        Self { marker }
    }

    /// The reserved prefix character
    #[must_use]
    pub const fn marker(&self) -> char {
        self.marker
    }

    /// Tier implied by the name alone
    #[must_use]
    pub fn tier_of(&self, name: &str) -> Visibility {
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(first), Some(second)) if first == self.marker && second == self.marker => {
                Visibility::Private
            }
            (Some(first), _) if first == self.marker => Visibility::Hidden,
            _ => Visibility::Public,
        }
    }
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}

/// Classify a binding name
///
/// A declared provide list wins over the naming convention for every name,
/// including names that carry the marker prefix.
#[must_use]
pub fn classify(name: &str, provided: &ProvideList, convention: &NamingConvention) -> Visibility {
    if provided.is_declared() {
        if provided.contains(name) {
            Visibility::Public
        } else {
            Visibility::Private
        }
    } else {
        convention.tier_of(name)
    }
}
