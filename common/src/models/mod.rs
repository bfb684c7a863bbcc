pub mod req;
pub mod dto;

pub use req::loan::{AdminDecisionRequest, LoanApplicationRequest, LoanStatusUpdateRequest};
pub use req::auth::{ChangePasswordRequest, CreateUserRequest, LoginRequest, UpdateUserRequest};
pub use req::admin::UpdateWeightRequest;
pub use dto::prediction::LoanPredictionDto;
pub use dto::auth::{LoginDto, UserDto};
