//! Password hashing and bearer token adapters.

mod bcrypt_hasher;
mod jwt_codec;

pub use bcrypt_hasher::BcryptPasswordHasher;
pub use jwt_codec::{JwtSettings, JwtTokenCodec, MAX_CLOCK_SKEW, MAX_TOKEN_TTL};
