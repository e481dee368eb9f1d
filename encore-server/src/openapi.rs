//! OpenAPI documentation configuration
//!
//! Generates the OpenAPI 3 document served at `/api-docs/openapi.json`.

use encore_core::{
    CacheLayer, CacheStatus, CuratedIndexResult, FolderResolution, IndexSummary,
    KeywordVerificationRecord, Region,
};
use utoipa::OpenApi;

use crate::handlers::{CuratedIndexResponse, HealthResponse, ReadyResponse};

/// Encore API - OpenAPI Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Encore - Curated Keyword Index API",
        version = "0.1.0",
        description = r#"
## Curated keyword verification for a music photo archive

Album editors tag each SmugMug album with curated keywords (band members,
venues, moments). Encore checks every curated keyword against the keywords
actually carried by the album's images:

1. **Compute** an index via `GET /curated-index/{album_id}`
2. Keywords present on at least one image are **verified**, the rest **missing**
3. Results are cached in memory and on disk until their TTL expires
4. Pass `refresh=1` to force a recomputation

The `/smug/*` routes proxy the SmugMug API for the archive viewer.
"#,
        license(name = "MIT OR Apache-2.0")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    tags(
        (name = "Curated Index", description = "Verify curated album keywords against image keywords"),
        (name = "SmugMug", description = "Band folder resolution and SmugMug pass-through routes"),
        (name = "Health", description = "Service health and readiness endpoints")
    ),
    paths(
        crate::handlers::health::health,
        crate::handlers::health::ready,
        crate::handlers::curated::curated_index_handler,
        crate::handlers::smug::folder_handler,
        crate::handlers::smug::album_images_handler,
        crate::handlers::smug::album_meta_handler,
        crate::handlers::smug::image_handler,
    ),
    components(
        schemas(
            HealthResponse,
            ReadyResponse,
            CuratedIndexResponse,
            CuratedIndexResult,
            IndexSummary,
            KeywordVerificationRecord,
            CacheStatus,
            CacheLayer,
            FolderResolution,
            Region,
        )
    )
)]
pub struct ApiDoc;
