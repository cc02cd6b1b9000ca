//! Which popups a student sees.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::store::{PopupStore, StoreError};
use crate::models::{Popup, PopupCandidate};

/// Filters candidates down to what `student_id` should see at `now`,
/// newest first.
///
/// A popup is shown when it is active, not expired, addressed to everyone or
/// to this student, and not yet in the student's seen set.
pub fn visible_popups(candidates: Vec<PopupCandidate>, student_id: Uuid, now: DateTime<Utc>) -> Vec<Popup> {
    let mut visible: Vec<Popup> = candidates
        .into_iter()
        .filter(|c| !c.seen && c.popup.is_live_at(now) && c.popup.is_addressed_to(student_id))
        .map(|c| c.popup)
        .collect();
    visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    visible
}

pub async fn popups_for_student(
    store: &dyn PopupStore,
    student_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Vec<Popup>, StoreError> {
    let candidates = store.candidates_for(student_id, now).await?;
    Ok(visible_popups(candidates, student_id, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PopupType;
    use crate::services::memory::InMemoryPopupStore;
    use chrono::Duration;

    fn popup(created_at: DateTime<Utc>) -> Popup {
        Popup {
            id: Uuid::new_v4(),
            title: "Notice".to_string(),
            message: "Body".to_string(),
            popup_type: PopupType::Announcement,
            is_active: true,
            expires_at: None,
            target_student_id: None,
            created_at,
            updated_at: created_at,
        }
    }

    fn unseen(popup: Popup) -> PopupCandidate {
        PopupCandidate { popup, seen: false }
    }

    #[test]
    fn test_expired_popup_excluded_even_if_active() {
        let now = Utc::now();
        let mut expired = popup(now - Duration::days(2));
        expired.expires_at = Some(now - Duration::hours(1));
        let live = popup(now - Duration::days(1));

        let visible = visible_popups(vec![unseen(expired), unseen(live.clone())], Uuid::new_v4(), now);
        assert_eq!(visible, vec![live]);
    }

    #[test]
    fn test_inactive_popup_excluded() {
        let now = Utc::now();
        let mut inactive = popup(now);
        inactive.is_active = false;
        assert!(visible_popups(vec![unseen(inactive)], Uuid::new_v4(), now).is_empty());
    }

    #[test]
    fn test_newest_first() {
        let now = Utc::now();
        let old = popup(now - Duration::days(5));
        let new = popup(now - Duration::minutes(5));
        let mid = popup(now - Duration::days(1));

        let visible = visible_popups(
            vec![unseen(old.clone()), unseen(new.clone()), unseen(mid.clone())],
            Uuid::new_v4(),
            now,
        );
        assert_eq!(visible, vec![new, mid, old]);
    }

    #[test]
    fn test_targeted_popup_only_for_target() {
        let now = Utc::now();
        let target = Uuid::new_v4();
        let mut targeted = popup(now);
        targeted.target_student_id = Some(target);

        assert_eq!(visible_popups(vec![unseen(targeted.clone())], target, now).len(), 1);
        assert!(visible_popups(vec![unseen(targeted)], Uuid::new_v4(), now).is_empty());
    }

    #[tokio::test]
    async fn test_seen_by_x_hidden_from_x_visible_to_y() {
        let now = Utc::now();
        let store = InMemoryPopupStore::new();
        let shared = popup(now - Duration::minutes(1));
        store.insert(shared.clone());
        let x = Uuid::new_v4();
        let y = Uuid::new_v4();

        assert!(store.mark_seen(shared.id, x).await.unwrap());

        assert!(popups_for_student(&store, x, now).await.unwrap().is_empty());
        assert_eq!(popups_for_student(&store, y, now).await.unwrap(), vec![shared]);
    }
}
