//! Closed sort-key vocabularies accepted by list pages and the API.
//!
//! Every key has the form `<field>_asc` or `<field>_desc`, where `<field>` is
//! drawn from a per-entity [`SortField`] enum. Anything else fails to parse.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::types::TypeConstraintError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Column a collection can be ordered by.
pub trait SortField: Copy + Eq + Default + 'static {
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;
}

/// A parsed `<field>_<direction>` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortKey<F: SortField> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F: SortField> SortKey<F> {
    pub fn asc(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }

    pub fn is_desc(&self) -> bool {
        self.direction == SortDirection::Desc
    }

    /// Next key for a column header link: ascending first, then descending,
    /// then back to the default order (`None`).
    pub fn toggle(current: Option<Self>, field: F) -> Option<Self> {
        match current {
            Some(key) if key.field == field && key.direction == SortDirection::Asc => {
                Some(Self::desc(field))
            }
            Some(key) if key.field == field => None,
            _ => Some(Self::asc(field)),
        }
    }

    /// Header link values for every field; an empty string means "no sort".
    pub fn toggle_links(current: Option<Self>) -> BTreeMap<&'static str, String> {
        F::ALL
            .iter()
            .map(|&field| {
                let next = Self::toggle(current, field)
                    .map(|key| key.to_string())
                    .unwrap_or_default();
                (field.as_str(), next)
            })
            .collect()
    }
}

impl<F: SortField> Display for SortKey<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.field.as_str(), self.direction.as_str())
    }
}

impl<F: SortField> FromStr for SortKey<F> {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TypeConstraintError::InvalidValue(format!("unknown sort order `{s}`"));
        let (field, direction) = s.rsplit_once('_').ok_or_else(invalid)?;
        let direction = match direction {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            _ => return Err(invalid()),
        };
        let field = F::ALL
            .iter()
            .copied()
            .find(|candidate| candidate.as_str() == field)
            .ok_or_else(invalid)?;
        Ok(Self { field, direction })
    }
}

impl<F: SortField> Serialize for SortKey<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, F: SortField> Deserialize<'de> for SortKey<F> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

macro_rules! sort_fields {
    ($(#[$meta:meta])* $name:ident { $first:ident => $first_key:literal $(, $variant:ident => $key:literal)* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub enum $name {
            #[default]
            $first,
            $($variant),*
        }

        impl SortField for $name {
            const ALL: &'static [Self] = &[Self::$first, $(Self::$variant),*];

            fn as_str(self) -> &'static str {
                match self {
                    Self::$first => $first_key,
                    $(Self::$variant => $key),*
                }
            }
        }
    };
}

sort_fields!(
    /// Sortable pet columns.
    PetSortField {
        Id => "id",
        Name => "name",
        Species => "species",
        Gender => "gender",
        Age => "age",
    }
);

sort_fields!(
    /// Sortable client columns; `user` orders by the linked user's email.
    ClientSortField {
        Id => "id",
        Name => "name",
        Address => "addr",
        User => "user",
    }
);

sort_fields!(
    /// Sortable foster columns.
    FosterSortField {
        Id => "id",
        StartDate => "startDate",
        EndDate => "endDate",
        ClientId => "clientId",
        PetId => "petId",
    }
);

sort_fields!(
    /// Sortable user columns.
    UserSortField {
        Id => "id",
        Email => "email",
        Name => "name",
        Role => "role",
    }
);

pub type PetSort = SortKey<PetSortField>;
pub type ClientSort = SortKey<ClientSortField>;
pub type FosterSort = SortKey<FosterSortField>;
pub type UserSort = SortKey<UserSortField>;
