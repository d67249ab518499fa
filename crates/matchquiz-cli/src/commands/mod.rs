pub mod init;
pub mod leaderboard;
pub mod score;
pub mod simulate;
pub mod validate;
