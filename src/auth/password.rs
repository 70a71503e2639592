use crate::core::errors::NeosecError;

pub fn hash_password(password: &str, cost: u32) -> Result<String, NeosecError> {
    bcrypt::hash(password, cost).map_err(|e| NeosecError::InternalServerError(format!("Password hashing error: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, NeosecError> {
    bcrypt::verify(password, hash)
        .map_err(|e| NeosecError::InternalServerError(format!("Password verification error: {}", e)))
}
