use serde::{Deserialize, Serialize};

use crate::animation::{CaptionId, TweenId};
use crate::section_id::SectionId;

/// A single, stateless instruction for the host view.
///
/// The core emits a `Vec<ViewUpdate>` as its state machines advance.
/// Hosts apply them in order; each update carries all the data it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ViewUpdate {
    /// Start warming an asset; report the result with `asset_settled`.
    PreloadAsset { url: String },

    /// New loading progress and phase label.
    LoadingProgress { percent: f64, message: String },

    /// The loading view is done; mount the portfolio.
    LoadingComplete,

    /// Header chrome crossed the scrolled threshold in either direction.
    ChromeScrolled { scrolled: bool },

    /// The highlighted navigation item changed.
    ActiveSection { id: SectionId },

    /// Move the document scroll position to an absolute offset.
    ScrollTo { top: f64, smooth: bool },

    /// The mobile navigation menu opened or closed. While open, body
    /// scrolling is locked.
    MenuToggled { open: bool },

    /// New text for a typewriter caption.
    Caption { id: CaptionId, text: String },

    /// New value for a counter or bar.
    TweenValue {
        id: TweenId,
        value: f64,
        display: String,
    },
}
