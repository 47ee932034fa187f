use anyhow::Result;

use crate::ai::profile::SiteProfile;
use crate::ai::prompt::system_prompt;
use crate::core::AppConfig;

pub fn run() -> Result<()> {
    let config = AppConfig::default();
    let profile = SiteProfile::load_or_default(config.profile_path.as_deref())?;
    println!("{}", system_prompt(&profile)?);
    Ok(())
}
