// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed wrappers around Oracle Cloud resource identifiers (OCIDs).
//!
//! An OCID looks like `ocid1.<kind>.<realm>.[region].<unique>`. The wrappers
//! never reject a string: identifiers come back from the API and from JSON
//! records written by earlier versions, and refusing to load them would be
//! worse than carrying an oddly shaped value around.

/// Returns the resource kind segment of an OCID (`"instance"`, `"volume"`, ...).
pub fn ocid_kind(ocid: &str) -> Option<&str> {
    let mut parts = ocid.split('.');
    match (parts.next(), parts.next()) {
        (Some(version), Some(kind)) if version.starts_with("ocid") && !kind.is_empty() => {
            Some(kind)
        }
        _ => None,
    }
}

/// Returns the last `n` characters of an identifier, for compact log lines.
pub fn tail(s: &str, n: usize) -> &str {
    if s.len() <= n {
        return s;
    }
    let mut start = s.len() - n;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}

/// Define a newtype OCID wrapper around `SmolStr` bound to one resource kind.
///
/// Generates `new()`, `as_str()`, `is_kind()`, `tail()`, `Display`,
/// `From<String>`, `From<&str>`, `PartialEq<str>`, `Borrow<str>` and `Deref`.
///
/// ```ignore
/// define_ocid! {
///     /// A compute instance.
///     pub struct InstanceId("instance");
/// }
/// ```
#[macro_export]
macro_rules! define_ocid {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($kind:literal);
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub smol_str::SmolStr);

        impl $name {
            /// Resource kind segment expected in identifiers of this type
            pub const KIND: &'static str = $kind;

            pub fn new(id: impl Into<smol_str::SmolStr>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// True if the identifier carries this type's resource kind
            pub fn is_kind(&self) -> bool {
                $crate::id::ocid_kind(&self.0) == Some(Self::KIND)
            }

            /// Last `n` characters, as printed in progress messages (`...abc123`)
            pub fn tail(&self, n: usize) -> &str {
                $crate::id::tail(&self.0, n)
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_ocid! {
    /// A compute instance.
    pub struct InstanceId("instance");
}

define_ocid! {
    /// A boot volume (original or cloned).
    pub struct BootVolumeId("bootvolume");
}

define_ocid! {
    /// A block volume (original or cloned).
    pub struct VolumeId("volume");
}

define_ocid! {
    /// A volume group, only ever created transiently while cloning.
    pub struct VolumeGroupId("volumegroup");
}

define_ocid! {
    /// A compartment (or the tenancy, which is the root compartment).
    pub struct CompartmentId("compartment");
}

define_ocid! {
    pub struct VnicId("vnic");
}

define_ocid! {
    pub struct SubnetId("subnet");
}

define_ocid! {
    pub struct PrivateIpId("privateip");
}

define_ocid! {
    pub struct PublicIpId("publicip");
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
