//! Resource kind implementations

pub mod cluster_type;
pub mod region;
pub mod tag;
pub mod webhook;

pub use cluster_type::ClusterTypeKind;
pub use region::RegionKind;
pub use tag::TagKind;
pub use webhook::WebhookKind;

use crate::codec::{slugify, Payload};
use crate::kind::WriteMode;
use netbox_resources::Attr;

/// Slug as declared, or derived from the name when creating without one
pub(crate) fn encode_slug(payload: &mut Payload, slug: &Attr<String>, name: &Attr<String>, mode: WriteMode) {
    match (slug, mode) {
        (Attr::Value(slug), _) if !slug.is_empty() => {
            payload.optional_string("slug", &Attr::Value(slug.clone()));
        }
        (_, WriteMode::Create) => {
            if let Attr::Value(name) = name {
                payload.optional_string("slug", &Attr::Value(slugify(name)));
            }
        }
        (_, WriteMode::Update) => {}
    }
}
