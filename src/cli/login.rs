// src/cli/login.rs — Store a backend token

use crate::auth::AuthStore;

pub fn run_login(token: Option<String>) -> anyhow::Result<()> {
    let token = match token {
        Some(token) => token,
        None => inquire::Password::new("Backend API token:")
            .without_confirmation()
            .prompt()?,
    };

    let token = token.trim().to_string();
    if token.is_empty() {
        anyhow::bail!("empty token");
    }

    let mut store = AuthStore::load().unwrap_or_default();
    store.set_api_token(token);
    store.save()?;
    println!("Signed in. Token stored in {}.", crate::infra::paths::auth_file_path().display());
    Ok(())
}
