// handlers/elevated/mod.rs - Elevated handlers (admin and super_admin only)
//
// Account administration, student groups with their classes and recordings,
// and home-page editing. Super-admin accounts get one extra guard in
// `users`: only a super_admin may touch them.

pub mod content;
pub mod group_media;
pub mod groups;
pub mod users;
