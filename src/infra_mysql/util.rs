use sqlx::mysql::MySqlDatabaseError;

/// Name of the unique key a duplicate-entry error tripped over, if any.
pub fn dup_key_name(err: &sqlx::Error) -> Option<String> {
    if let sqlx::Error::Database(db) = err {
        if let Some(mysql_err) = db.try_downcast_ref::<MySqlDatabaseError>() {
            if mysql_err.number() == 1062 {
                // ER_DUP_ENTRY: "Duplicate entry '...' for key 'account.uq_account_email'"
                let key = mysql_err
                    .message()
                    .rsplit("for key ")
                    .next()
                    .unwrap_or_default()
                    .trim_matches('\'');
                return Some(key.to_string());
            }
        }
    }

    None
}
