use clap::Subcommand;
use focusloop_core::alert::play_file;
use focusloop_core::SoundAlert;

use super::Context;

#[derive(Subcommand)]
pub enum SoundAction {
    /// Play the configured alert once and wait for it to finish
    Test,
}

pub fn run(ctx: &Context, action: SoundAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SoundAction::Test => {
            let store = ctx.open_store()?;
            // Errors are returned directly here, so nothing reads the channel.
            let (tx, _rx) = std::sync::mpsc::channel();
            let alert = SoundAlert::new(ctx.resources(), tx);
            let path = alert.locate(&store.config().sound_file)?;
            play_file(&path)?;
            println!("played {}", path.display());
        }
    }
    Ok(())
}
