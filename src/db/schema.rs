//! MySQL DDL for the scaffold's user store.
//!
//! Table and column names are part of the external contract; do not rename.
//! Every statement is existence-checked so the migrator stays idempotent.

pub const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INT PRIMARY KEY AUTO_INCREMENT,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL,
    password VARCHAR(255) NOT NULL
)
"#;

pub const CREATE_USER_ROLES: &str = r#"
CREATE TABLE IF NOT EXISTS user_roles (
    user_id INT,
    role VARCHAR(255),
    PRIMARY KEY (user_id, role)
)
"#;

pub const DROP_USER_ROLES: &str = "DROP TABLE IF EXISTS user_roles";

pub const DROP_USERS: &str = "DROP TABLE IF EXISTS users";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_statements_are_existence_checked() {
        assert!(CREATE_USERS.contains("IF NOT EXISTS"));
        assert!(CREATE_USER_ROLES.contains("IF NOT EXISTS"));
        assert!(DROP_USERS.contains("IF EXISTS"));
        assert!(DROP_USER_ROLES.contains("IF EXISTS"));
    }

    #[test]
    fn contract_table_layout_is_unchanged() {
        assert!(CREATE_USERS.contains("id INT PRIMARY KEY AUTO_INCREMENT"));
        assert!(CREATE_USER_ROLES.contains("PRIMARY KEY (user_id, role)"));
    }
}
