//! Status enums mapping to SMALLINT columns.
//!
//! Discriminants are published in query strings (`?status=3,4`) and stored
//! in `cooling_requests.status_id`, so they must never be renumbered.

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Every variant in discriminant order.
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Look up a variant by its database status ID.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some($name::$variant), )+
                    _ => None,
                }
            }

            /// Lowercase human-readable name.
            pub fn label(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

define_status_enum! {
    /// Cooling request lifecycle status.
    RequestStatus {
        Draft = 1 => "draft",
        Deleted = 2 => "deleted",
        Formed = 3 => "formed",
        Completed = 4 => "completed",
        Rejected = 5 => "rejected",
    }
}

impl RequestStatus {
    /// Completed, rejected and deleted requests never change status again.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RequestStatus::Completed | RequestStatus::Rejected | RequestStatus::Deleted
        )
    }

    /// Whether a request in this status may appear in request listings.
    ///
    /// Drafts are private carts and deleted requests are gone.
    pub fn is_listable(self) -> bool {
        !matches!(self, RequestStatus::Draft | RequestStatus::Deleted)
    }
}

/// Statuses that may appear in request listings.
pub fn listable_statuses() -> Vec<RequestStatus> {
    RequestStatus::ALL
        .iter()
        .copied()
        .filter(|s| s.is_listable())
        .collect()
}
