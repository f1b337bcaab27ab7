use quire::validate::{Structure, Scalar};


#[derive(Deserialize, Debug, PartialEq, Eq, Clone, Default)]
pub struct Channels {
    /// Destroy a channel when its last member leaves
    pub destroy_when_empty: bool,
}

pub fn validator<'x>() -> Structure<'x> {
    Structure::new()
    .member("destroy_when_empty", Scalar::new().default(false))
}
