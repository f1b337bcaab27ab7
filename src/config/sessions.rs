use quire::validate::{Structure, Scalar};


#[derive(Deserialize, Debug, PartialEq, Eq, Clone, Default)]
pub struct Sessions {
    /// Refuse to bind a uid that already has a bound session
    pub single_session: bool,
}

pub fn validator<'x>() -> Structure<'x> {
    Structure::new()
    .member("single_session", Scalar::new().default(false))
}
