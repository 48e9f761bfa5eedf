//! The content access gate and the video preview cutoff.
//!
//! Both are presentation-layer decisions: the gate chooses render-full vs
//! render-locked, and the cutoff bounds unpaid playback. Neither is a
//! security control; row-level enforcement belongs to the storage layer's
//! authorization rules at the HTTP boundary.

use std::collections::HashSet;

use crate::auth::AuthUser;
use crate::storage::models::ContentRecord;

/// Decide whether `user` may fully access `item`.
///
/// Admins bypass every check; non-premium items are open to everyone
/// (including anonymous visitors); premium items require a purchase row.
pub fn can_access(
    item: &ContentRecord,
    user: Option<&AuthUser>,
    purchased_ids: &HashSet<String>,
) -> bool {
    if user
        .and_then(|u| u.profile.as_ref())
        .is_some_and(|p| p.is_admin)
    {
        return true;
    }
    if !item.is_premium {
        return true;
    }
    purchased_ids.contains(&item.id)
}

/// Action the player must take when the preview boundary is crossed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cutoff {
    /// Pause playback and seek back to this position.
    pub clamp_to: f64,
}

/// Per-playback state machine enforcing the preview-duration cutoff for
/// denied access. Fires exactly once per crossing of the boundary; seeking
/// back below the boundary re-arms it.
///
/// Advisory only: a capable user can bypass this. It is a UX gate, not DRM.
#[derive(Debug)]
pub struct PreviewGate {
    boundary: f64,
    tripped: bool,
}

impl PreviewGate {
    pub fn new(preview_duration_secs: u32) -> Self {
        Self {
            boundary: f64::from(preview_duration_secs),
            tripped: false,
        }
    }

    /// Feed the player's current position. Returns the cutoff action on the
    /// first update at or past the boundary, `None` otherwise.
    pub fn on_time_update(&mut self, current_time: f64) -> Option<Cutoff> {
        if current_time >= self.boundary {
            if self.tripped {
                return None;
            }
            self.tripped = true;
            Some(Cutoff {
                clamp_to: self.boundary,
            })
        } else {
            self.tripped = false;
            None
        }
    }

    pub fn boundary(&self) -> f64 {
        self.boundary
    }
}
