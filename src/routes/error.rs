use rocket::serde::Serialize;
use rocket::serde::json::Json;
use rocket::{Request, catch};

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ErrorBody {
    pub error: String,
}

fn body(message: &str) -> Json<ErrorBody> {
    Json(ErrorBody { error: message.to_string() })
}

#[catch(400)]
pub fn bad_request(_: &Request) -> Json<ErrorBody> {
    body("Bad request")
}

#[catch(401)]
pub fn unauthorized(_: &Request) -> Json<ErrorBody> {
    body("Not authenticated")
}

#[catch(404)]
pub fn not_found(_: &Request) -> Json<ErrorBody> {
    body("Not found")
}

#[catch(422)]
pub fn unprocessable(_: &Request) -> Json<ErrorBody> {
    body("Unprocessable request body")
}

#[catch(500)]
pub fn internal_error(_: &Request) -> Json<ErrorBody> {
    body("Internal server error")
}
