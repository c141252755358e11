//! Build-time identity of the component.
//!
//! The three identifiers must stay stable across builds: clients bind to them,
//! so changing one is a compatibility break.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::error::RegistryError;

// ---------------------------------------------------------------------------
// Guid
// ---------------------------------------------------------------------------

/// An opaque 128-bit interop identifier.
///
/// Equality and hashing only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Guid(Uuid);

impl Guid {
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }
}

impl fmt::Display for Guid {
    /// Registry form: `{1B31B683-F0AA-4E71-8F50-F2D2E5E9E210}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Uuid::encode_buffer();
        f.write_str(self.0.braced().encode_upper(&mut buf))
    }
}

impl FromStr for Guid {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|source| RegistryError::InvalidGuid {
                value: s.to_owned(),
                source,
            })
    }
}

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

/// Type library version; only major and minor take part in registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TypeLibVersion {
    pub major: u16,
    pub minor: u16,
}

impl TypeLibVersion {
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for TypeLibVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// Static identity bundle advertised by the registration controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityDescriptor {
    pub interface_id: Guid,
    pub class_id: Guid,
    pub library_id: Guid,
    pub version: TypeLibVersion,
    pub description: &'static str,
}

impl IdentityDescriptor {
    /// The area component as built. Version and description come from package
    /// metadata, so a missing or malformed value fails compilation.
    pub const AREA_COMPONENT: IdentityDescriptor = IdentityDescriptor {
        interface_id: Guid::from_u128(0x1B31B683_F0AA_4E71_8F50_F2D2E5E9E210),
        class_id: Guid::from_u128(0x71AD0B2F_E5D0_4272_A4FD_18F707D5E0D6),
        library_id: Guid::from_u128(0x47A20781_26AD_465F_BDA9_AC59CEA74B69),
        version: TypeLibVersion::new(
            parse_version_component(env!("CARGO_PKG_VERSION_MAJOR")),
            parse_version_component(env!("CARGO_PKG_VERSION_MINOR")),
        ),
        description: env!("CARGO_PKG_DESCRIPTION"),
    };
}

const fn parse_version_component(s: &str) -> u16 {
    let bytes = s.as_bytes();
    assert!(!bytes.is_empty(), "empty package version component");
    let mut value: u16 = 0;
    let mut i = 0;
    while i < bytes.len() {
        assert!(bytes[i].is_ascii_digit(), "non-numeric package version component");
        value = value * 10 + (bytes[i] - b'0') as u16;
        i += 1;
    }
    value
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
