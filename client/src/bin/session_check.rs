use iparental_client::{
    config::Config,
    persist::{FileSessionBacking, SessionBacking},
    store::SessionState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "iparental_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    let backing = FileSessionBacking::new(&config.data_dir);

    let clear_requested = std::env::args().any(|arg| arg == "--clear");
    if clear_requested {
        backing.clear()?;
        tracing::info!("cleared persisted session");
        return Ok(());
    }

    match backing.load()? {
        None => tracing::info!("no persisted session"),
        Some(persisted) => {
            // Check the blob as stored; hydration would paper over the
            // inconsistencies this tool exists to report.
            let raw = SessionState {
                current_user: persisted.user.clone(),
                is_authenticated: persisted.is_authenticated,
                is_loading: false,
                child_profiles: persisted.child_profiles.clone(),
                active_child_profile: persisted.active_child_profile.clone(),
            };
            match &raw.current_user {
                Some(user) => tracing::info!(
                    user_id = %user.id,
                    profiles = raw.child_profiles.len(),
                    consistent = raw.is_consistent(),
                    "persisted session found"
                ),
                None => tracing::info!("persisted session is signed out"),
            }
            if !raw.is_consistent() {
                tracing::warn!("session blob is inconsistent, rerun with --clear to discard it");
            }
        }
    }

    Ok(())
}
