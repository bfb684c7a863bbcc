// 服务端中间件实现

pub mod account;

pub use account::DbAccountVerifier;
