use restline::prelude::*;

pub struct HelloController;

#[controller]
impl HelloController {
    /// GET /hello
    pub fn get(&self) -> String {
        "Hello, World".to_string()
    }

    /// GET /hello/name/{name}
    pub fn get_by_name(&self, name: String) -> String {
        format!("Hello, {name}")
    }
}
