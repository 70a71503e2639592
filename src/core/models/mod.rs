pub mod audit;
pub mod firewall;
pub mod group;
pub mod invitation;
pub mod membership;
pub mod profile;
pub mod subscription;
pub mod user;
pub mod vpn;
