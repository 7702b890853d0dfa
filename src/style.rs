//! Terminal styling utilities
//!
//! Semantic colors for CLI output:
//! - Cyan bold for headers, cyan for technical identifiers
//! - Green for the current default
//! - Yellow for configured endpoints that are not the default

use crossterm::style::Stylize;

/// Extension trait for consistent styling
///
/// ```
/// use audio_switcher::style::SwitcherStyle;
///
/// println!("{}", "PLAYBACK DEVICES:".header());
/// println!("{}", "alsa_output.pci-0000_00_1f.3.analog-stereo".technical());
/// ```
pub trait SwitcherStyle: Stylize {
    /// Section headers (cyan bold)
    fn header(self) -> <<Self as Stylize>::Styled as Stylize>::Styled
    where
        Self: Sized,
        <Self as Stylize>::Styled: Stylize,
    {
        self.cyan().bold()
    }

    /// Active/default markers (green)
    fn success(self) -> <Self as Stylize>::Styled
    where
        Self: Sized,
    {
        self.green()
    }

    /// Partial states (yellow)
    fn warning(self) -> <Self as Stylize>::Styled
    where
        Self: Sized,
    {
        self.yellow()
    }

    /// Node names, normalized names, paths (cyan)
    fn technical(self) -> <Self as Stylize>::Styled
    where
        Self: Sized,
    {
        self.cyan()
    }
}

impl<T: Stylize> SwitcherStyle for T {}
