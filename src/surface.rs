//! Capabilities the page glue needs from whatever is displaying it.
//!
//! A browser would hand these out as DOM nodes and `window.location`; here
//! they are traits so the glue can run against anything, including test
//! doubles and the command line.

pub const LOGIN_PATH: &str = "/login";
pub const LOGOUT_PATH: &str = "/logout";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Height {
    /// Let the content decide.
    Auto,
    Pixels(u32),
}

/// A multi-line text input that can be resized.
pub trait TextField {
    fn set_height(&mut self, height: Height);

    /// Height needed to show the whole content without scrolling. Never less
    /// than the current height.
    fn scroll_height(&self) -> u32;
}

/// Something that can send the user to another page.
pub trait Navigator {
    fn navigate(&mut self, path: &str);
}

/// Fit `field` to its content. The height is reset first so the field can
/// shrink as well as grow.
pub fn auto_resize<F: TextField + ?Sized>(field: &mut F) {
    field.set_height(Height::Auto);
    let height = field.scroll_height();
    field.set_height(Height::Pixels(height));
}

/// Starts the backend's sign-in flow.
pub fn login<N: Navigator + ?Sized>(navigator: &mut N) {
    navigator.navigate(LOGIN_PATH);
}

pub fn logout<N: Navigator + ?Sized>(navigator: &mut N) {
    navigator.navigate(LOGOUT_PATH);
}

/// Records where the user was sent, like `window.location.href`.
#[derive(Debug, Default)]
pub struct Location {
    pub href: Option<String>,
}

impl Navigator for Location {
    fn navigate(&mut self, path: &str) {
        self.href = Some(path.to_owned());
    }
}
