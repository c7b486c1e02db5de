pub mod extractor;
pub mod jwt;
pub mod password;

pub use extractor::{AdminUser, CurrentUser};
pub use jwt::{Claims, JwtError, JwtService, TokenPair, TokenType};
pub use password::{Argon2Encoder, PasswordEncoder};
