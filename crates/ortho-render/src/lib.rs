//! # ortho-render
//!
//! Software renderer for one orthogonal 2D slice of a 3D volume, with
//! interactive window/level, intensity thresholding, a label overlay and
//! pixel-accurate picking between screen, slice, index and world space.
//!
//! # Architecture
//!
//! - [`buffers`] - change-driven off-screen buffer recompute (window/level,
//!   threshold, color ramp, label filter)
//! - [`mapper`] - screen point to index/world conversion ([`mapper::Pick`])
//! - [`surface`] - RGBA8 target with an affine transform stack
//! - [`Renderer2D`] - the facade tying camera, interactor, buffers and
//!   compositor together, one `render` call per frame tick
//!
//! Everything is synchronous and single-threaded per renderer; the
//! [`ortho_core::Volume`] may be shared between several renderers, so its
//! cursors and window fields are re-read fresh on every call.
//!
//! # Example
//!
//! ```rust
//! use ortho_core::build::VolumeSource;
//! use ortho_render::Renderer2D;
//!
//! let mut volume = VolumeSource::new(vec![0.0; 8 * 8 * 8], [8, 8, 8])
//!     .build()
//!     .unwrap();
//! let mut renderer = Renderer2D::new(256, 256, "axial".parse().unwrap());
//! renderer.add(&volume);
//! renderer.render(&mut volume);
//! assert_eq!(renderer.surface().pixels().len(), 256 * 256 * 4);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffers;
pub mod camera;
mod compositor;
pub mod events;
pub mod interactor;
pub mod mapper;
mod renderer;
pub mod surface;

pub use buffers::SliceBuffers;
pub use camera::Camera2D;
pub use events::{NullEvents, RenderEvents};
pub use interactor::InteractorState;
pub use mapper::Pick;
pub use renderer::{DisplayConvention, Pointer, Renderer2D, RendererConfig};
pub use surface::Surface;
