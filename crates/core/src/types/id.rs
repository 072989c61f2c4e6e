//! Database row IDs.
//!
//! Every table uses a serial `i32` key. Each entity gets its own newtype so a
//! `CategoryId` cannot be passed where a `ProductId` is expected. IDs arriving
//! from clients (path segments, JSON bodies) must be positive; rows read back
//! from Postgres are trusted as-is.

use thiserror::Error;

/// A client-supplied ID that is not a positive integer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("id must be a positive integer, got `{0}`")]
pub struct InvalidId(pub String);

/// Parse a client-supplied ID.
///
/// # Errors
///
/// Returns [`InvalidId`] unless `raw` is a base-10 integer greater than zero.
pub fn parse_positive(raw: &str) -> Result<i32, InvalidId> {
    match raw.trim().parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(InvalidId(raw.to_owned())),
    }
}

/// Declare an entity ID newtype.
///
/// ```rust
/// # use souq_core::define_id;
/// define_id!(BrandId);
///
/// let brand: BrandId = "12".parse().unwrap();
/// assert_eq!(brand.as_i32(), 12);
/// assert!("0".parse::<BrandId>().is_err());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ::serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::InvalidId;

            fn from_str(raw: &str) -> ::core::result::Result<Self, Self::Err> {
                $crate::types::id::parse_positive(raw).map(Self)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let id = <i32 as ::serde::Deserialize>::deserialize(deserializer)?;
                if id > 0 {
                    Ok(Self(id))
                } else {
                    Err(::serde::de::Error::custom($crate::types::InvalidId(id.to_string())))
                }
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <i32 as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_id!(UserId);
define_id!(CompanyId);
define_id!(CategoryId);
define_id!(SubcategoryId);
define_id!(ProductId);
define_id!(ProductColorId);
