use std::fmt;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Route {
    ChatRoot,
    Login,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::ChatRoot => "/",
            Route::Login => "/login",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
