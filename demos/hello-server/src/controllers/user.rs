use crate::users::UserService;
use restline::axum::http::StatusCode;
use restline::prelude::*;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUser {
    #[garde(length(min = 1, max = 64))]
    name: String,
    #[garde(length(min = 3), contains("@"))]
    email: String,
}

#[derive(DeriveInjectable)]
pub struct UserController {
    users: Arc<dyn UserService>,
}

#[controller(path = "/users")]
impl UserController {
    /// GET /users/id/{id}
    pub fn get_by_id(&self, id: u64) -> (BaseResponse, Option<BoxError>) {
        let Some(user) = self.users.find(id) else {
            let mut response = BaseResponse::new();
            response.set_code(StatusCode::NOT_FOUND.as_u16());
            return (response, Some("user not found".into()));
        };
        match BaseResponse::from_data(&user) {
            Ok(response) => (response, None),
            Err(err) => (BaseResponse::new(), Some(err.into())),
        }
    }

    /// POST /users
    pub fn post(&self, request: Body<CreateUser>) -> Result<BaseResponse, BoxError> {
        let CreateUser { name, email } = request.into_inner();
        let user = self.users.create(name, email);
        Ok(BaseResponse::from_data(&user)?)
    }

    /// DELETE /users/id/{id}
    pub fn delete_by_id(&self, id: u64, ctx: &mut Context) {
        if self.users.remove(id) {
            ctx.set_status(StatusCode::NO_CONTENT);
        } else {
            ctx.response_error("user not found", StatusCode::NOT_FOUND);
        }
    }
}
