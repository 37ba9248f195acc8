pub mod artist_list;
pub mod help_overlay;
pub mod home;
pub mod login_page;
pub mod nav_bar;
pub mod playlist_list;
pub mod track_list;

use ratatui::style::{Modifier, Style};
use ratatui::text::Span;

use crate::inflight::RenderHint;
use crate::ranking::mute_label;
use crate::theme::{C_ACCENT, C_OK, C_PENDING};

/// Columns taken by the `[ mute ]` button at the start of a row.
pub const BUTTON_WIDTH: u16 = 9;

/// The mute button cell.  The label comes from the entity's own flag; while
/// a request is in flight it shows a pulsing ellipsis and is inert.
pub fn mute_button(blocked: bool, hint: RenderHint) -> Span<'static> {
    let label = match hint {
        RenderHint::PendingHidden => " ",
        RenderHint::PendingVisible => mute_label(blocked, true),
        RenderHint::Normal => mute_label(blocked, false),
    };
    let color = match (hint.is_pending(), blocked) {
        (true, _) => C_PENDING,
        (false, true) => C_OK,
        (false, false) => C_ACCENT,
    };
    Span::styled(
        format!("[{:^6}] ", label),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}
