// src/ranking.rs
//
// Popularity scoring shared by the post feed, the admin user listing and
// the admin comment listing. The score is a plain engagement sum; ties
// keep their original (most recent first) order, so the sort must be
// stable.

use serde::Serialize;

use crate::models::comment::CommentModeration;
use crate::models::post::PostDetail;
use crate::models::user::UserDetail;

/// Engagement counters feeding the popularity score. Anything not
/// applicable to a type stays at the default of zero.
pub trait EngagementCounts {
    fn like_count(&self) -> usize {
        0
    }
    fn comment_count(&self) -> usize {
        0
    }
    fn reply_count(&self) -> usize {
        0
    }
    fn save_count(&self) -> usize {
        0
    }
}

/// likes + comments + replies + saves, equally weighted.
pub fn popularity_score<T: EngagementCounts>(item: &T) -> i64 {
    (item.like_count() + item.comment_count() + item.reply_count() + item.save_count()) as i64
}

/// An item paired with its popularity score. Serializes flat, with the
/// score exposed as 'totalScore'.
#[derive(Debug, Serialize)]
pub struct Ranked<T> {
    #[serde(flatten)]
    pub item: T,
    #[serde(rename = "totalScore")]
    pub total_score: i64,
}

/// Scores every item and sorts by score, highest first. Vec::sort_by is
/// stable, so equally scored items keep their input order.
pub fn rank<T: EngagementCounts>(items: Vec<T>) -> Vec<Ranked<T>> {
    let mut ranked: Vec<Ranked<T>> = items
        .into_iter()
        .map(|item| {
            let total_score = popularity_score(&item);
            Ranked { item, total_score }
        })
        .collect();
    ranked.sort_by(|a, b| b.total_score.cmp(&a.total_score));
    ranked
}

impl EngagementCounts for PostDetail {
    fn like_count(&self) -> usize {
        self.likes.len()
    }
    fn comment_count(&self) -> usize {
        self.comments.len()
    }
    fn reply_count(&self) -> usize {
        self.comments.iter().map(|c| c.replies.len()).sum()
    }
    fn save_count(&self) -> usize {
        self.saved.len()
    }
}

impl EngagementCounts for UserDetail {
    fn like_count(&self) -> usize {
        self.likes.len()
    }
    fn comment_count(&self) -> usize {
        self.comments.len()
    }
    fn reply_count(&self) -> usize {
        self.comments.iter().map(|c| c.replies.len()).sum()
    }
    fn save_count(&self) -> usize {
        self.saved.len()
    }
}

// The admin comment listing orders by reply count alone.
impl EngagementCounts for CommentModeration {
    fn reply_count(&self) -> usize {
        self.replies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Engagement {
        likes: usize,
        comments: usize,
        replies: usize,
        saves: usize,
    }

    impl EngagementCounts for Engagement {
        fn like_count(&self) -> usize {
            self.likes
        }
        fn comment_count(&self) -> usize {
            self.comments
        }
        fn reply_count(&self) -> usize {
            self.replies
        }
        fn save_count(&self) -> usize {
            self.saves
        }
    }

    fn engagement(likes: usize, comments: usize, replies: usize, saves: usize) -> Engagement {
        Engagement {
            likes,
            comments,
            replies,
            saves,
        }
    }

    #[test]
    fn test_score_sums_all_counters() {
        let item = engagement(2, 3, 4, 1);
        assert_eq!(popularity_score(&item), 10);
    }

    #[test]
    fn test_score_zero_without_engagement() {
        let item = engagement(0, 0, 0, 0);
        assert_eq!(popularity_score(&item), 0);
    }

    #[test]
    fn test_rank_orders_by_score_descending() {
        let items = vec![engagement(1, 0, 0, 0), engagement(5, 0, 0, 0), engagement(3, 0, 0, 0)];

        let ranked = rank(items);
        let scores: Vec<i64> = ranked.iter().map(|r| r.total_score).collect();
        assert_eq!(scores, vec![5, 3, 1]);
    }

    #[test]
    fn test_rank_keeps_input_order_on_ties() {
        // Items are fed newest first. Equal scores must not reshuffle.
        let items = vec![
            engagement(2, 0, 0, 0), // newest
            engagement(1, 1, 0, 0),
            engagement(0, 0, 2, 0), // oldest
        ];

        let ranked = rank(items);
        assert_eq!(ranked[0].item.likes, 2);
        assert_eq!(ranked[1].item.comments, 1);
        assert_eq!(ranked[2].item.replies, 2);
    }

    #[test]
    fn test_rank_attaches_matching_score() {
        let ranked = rank(vec![engagement(1, 2, 0, 1)]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].total_score, 4);
    }

    #[test]
    fn test_default_counters_are_zero() {
        struct Bare;
        impl EngagementCounts for Bare {}

        assert_eq!(popularity_score(&Bare), 0);
    }
}
