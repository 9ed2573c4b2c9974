use restline::prelude::*;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[garde(length(min = 1))]
    username: String,
    #[garde(length(min = 8))]
    password: String,
}

pub struct LoginController;

#[controller]
impl LoginController {
    /// POST /login
    pub fn post(&self, request: Body<LoginRequest>) -> Result<BaseResponse, BoxError> {
        let LoginRequest { username, password } = request.into_inner();
        if password == "password" {
            return Err("weak password".into());
        }
        tracing::info!("{} logged in", username);
        Ok(BaseResponse::with_value(
            serde_json::json!({ "token": format!("{username}-token") }),
        ))
    }
}
