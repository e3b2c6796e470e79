pub mod lists;
pub mod login;
pub mod segments;
pub mod settings;
pub mod thumbnails;
pub mod users;
pub mod videos;

pub use lists::{
    add_advertiser, add_category, delete_advertiser, delete_category, list_advertisers,
    list_categories, rename_advertiser, rename_category,
};
pub use login::{get_me, post_login, post_logout, post_register};
pub use segments::{apply_edit, new_segment};
pub use settings::{get_settings, update_settings};
pub use thumbnails::upload_thumbnail;
pub use users::{delete_user, list_users, update_role};
pub use videos::{create_video, delete_video, get_video, list_videos, sample_video, update_video};
