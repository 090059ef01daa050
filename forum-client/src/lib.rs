mod backend;
pub use backend::Backend;

mod cursor;
pub use cursor::PageCursorStore;

mod error;
pub use error::{ConsistencyWarning, Error};

mod loader;
pub use loader::{LoadOutcome, ReplyRequest};

mod mutation;
pub use mutation::{Created, Placement};

mod node;
pub use node::CommentNode;

mod order;
pub use order::OrderExt;

mod sort;
pub use sort::{MemoryPreferences, Preferences, SortController};

pub mod tree;

mod view;
pub use view::ThreadView;

pub mod api {
    pub use forum_api::*;
}

pub mod prelude {
    pub use crate::{Backend, OrderExt, Preferences};
}
