use serde::Serialize;

use crate::auth::{generate_temporary_password, hash_password};
use crate::cli::{connect, store, OutputFormat};
use crate::database::models::{normalize_email, NewUser, Role};
use crate::database::UserStore;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IssuedPassword {
    id: i64,
    email: String,
    role: Role,
    temporary_password: String,
}

impl IssuedPassword {
    fn render(&self) -> String {
        format!(
            "{} ({}, id {})\nTemporary password: {}\nThe password must be changed at first login; it will not be shown again.",
            self.email, self.role, self.id, self.temporary_password
        )
    }
}

/// The only way to create a super_admin account
pub async fn create(name: String, email: String, role: String, output_format: OutputFormat) -> anyhow::Result<()> {
    let role: Role = role.trim().parse()?;
    let name = name.trim().to_string();
    if name.is_empty() {
        anyhow::bail!("name must not be empty");
    }

    let manager = connect().await?;
    let temporary_password = generate_temporary_password();
    let created = store(&manager)
        .create_user(NewUser {
            name,
            email: normalize_email(&email),
            role,
            password_hash: hash_password(&temporary_password)?,
            must_change_password: true,
        })
        .await;
    manager.close().await;
    let user = created?;

    tracing::info!("Created {} account {} from the CLI", user.role, user.id);
    let issued = IssuedPassword {
        id: user.id,
        email: user.email,
        role: user.role,
        temporary_password,
    };
    output_format.emit(&issued, || issued.render())
}

pub async fn reset_password(email: String, output_format: OutputFormat) -> anyhow::Result<()> {
    let email = normalize_email(&email);
    let manager = connect().await?;
    let users = store(&manager);

    let outcome = async {
        let credentials = users
            .find_credentials_by_email(&email)
            .await?
            .ok_or_else(|| anyhow::anyhow!("no account with email {}", email))?;
        let temporary_password = generate_temporary_password();
        users
            .set_password(credentials.user.id, hash_password(&temporary_password)?, true)
            .await?;
        anyhow::Ok(IssuedPassword {
            id: credentials.user.id,
            email: credentials.user.email,
            role: credentials.user.role,
            temporary_password,
        })
    }
    .await;
    manager.close().await;
    let issued = outcome?;

    tracing::info!("Reset password for user {} from the CLI", issued.id);
    output_format.emit(&issued, || issued.render())
}
