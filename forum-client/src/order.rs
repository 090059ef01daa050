use std::cmp::Ordering;

use crate::{
    api::{Comment, Sort, SortDirection, SortField},
    CommentNode,
};

pub trait OrderExt {
    fn compare(&self, a: &Comment, b: &Comment) -> Ordering;
    fn sort(&self, nodes: &mut [CommentNode]);
}

fn lowercase(s: &Option<String>) -> Option<String> {
    s.as_ref().map(|s| s.to_lowercase())
}

impl OrderExt for Sort {
    /// The direction only applies to the sort key, equal keys are always
    /// ordered by ascending id
    fn compare(&self, a: &Comment, b: &Comment) -> Ordering {
        let by_key = match self.field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UserName => a.user_name.to_lowercase().cmp(&b.user_name.to_lowercase()),
            // No email sorts before any email
            SortField::Email => lowercase(&a.email).cmp(&lowercase(&b.email)),
        };
        let by_key = match self.direction {
            SortDirection::Asc => by_key,
            SortDirection::Desc => by_key.reverse(),
        };
        by_key.then_with(|| a.id.cmp(&b.id))
    }

    fn sort(&self, nodes: &mut [CommentNode]) {
        nodes.sort_by(|a, b| self.compare(&a.comment, &b.comment))
    }
}
