use super::{Services, with_spinner};
use anyhow::Result;
use console::{Term, style};
use ytsdl::provider::{BrowseQuery, MoviePage, ProviderMovie};

/// Catalogue filters as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct BrowseFilters {
    pub query: Option<String>,
    pub quality: Option<String>,
    pub genre: Option<String>,
    pub minimum_rating: Option<u8>,
    pub sort_by: Option<String>,
    pub order_by: Option<String>,
    pub limit: u32,
    pub page: u32,
}

impl BrowseFilters {
    /// Parse and bound-check the filters before anything goes on the wire.
    pub fn into_query(self) -> ytsdl::Result<BrowseQuery> {
        let query = BrowseQuery {
            query_term: self.query,
            quality: self.quality.as_deref().map(str::parse).transpose()?,
            genre: self.genre,
            minimum_rating: self.minimum_rating,
            sort_by: self.sort_by.as_deref().map(str::parse).transpose()?,
            order_by: self.order_by.as_deref().map(str::parse).transpose()?,
            limit: self.limit,
            page: self.page,
        };
        query.validate()?;
        Ok(query)
    }
}

pub async fn handle_browse(services: &Services, filters: BrowseFilters) -> Result<()> {
    let term = Term::stdout();
    let query = filters.into_query()?;

    let page = with_spinner(
        format!(
            "Browsing {} (page {})...",
            services.provider.name(),
            query.page
        ),
        services.provider.browse(&query),
    )
    .await?;

    print_page(&term, services.provider.name(), &page)
}

fn print_page(term: &Term, provider: &str, page: &MoviePage) -> Result<()> {
    if page.movies.is_empty() {
        term.write_line(&format!(
            "{} No movies on page {} ({} match(es) on {})",
            style("❌").red(),
            page.page,
            page.total,
            provider
        ))?;
        return Ok(());
    }

    term.write_line(&format!(
        "{} Page {} of {} ({} movie(s) on {}):",
        style("📚").cyan(),
        page.page,
        page.page_count(),
        style(page.total).green().bold(),
        provider
    ))?;
    for movie in &page.movies {
        term.write_line(&format!("   {}", listing_line(movie)))?;
    }

    if u64::from(page.page) < page.page_count() {
        term.write_line(&format!(
            "{} Next page: --page {}",
            style("💡").yellow(),
            page.page + 1
        ))?;
    }

    Ok(())
}

/// Provider id, title, rating, IMDb id and the qualities on offer.
fn listing_line(movie: &ProviderMovie) -> String {
    let mut line = format!("#{}  {}", movie.provider_id, movie.display_title());
    if let Some(rating) = movie.rating {
        line.push_str(&format!("  ⭐ {:.1}", rating));
    }
    if let Some(imdb_id) = &movie.imdb_id {
        line.push_str(&format!("  {}", imdb_id));
    }
    if !movie.variants.is_empty() {
        let labels: Vec<&str> = movie
            .variants
            .iter()
            .map(|v| v.quality_label.as_str())
            .collect();
        line.push_str(&format!("  [{}]", labels.join(", ")));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::{self, FakeLookup, FakeProvider};
    use ytsdl::error::Error;
    use ytsdl::provider::{SortField, SortOrder};
    use ytsdl::quality::Quality;

    fn filters() -> BrowseFilters {
        BrowseFilters {
            limit: 20,
            page: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_filters_parse_into_query() {
        let query = BrowseFilters {
            query: Some("inception".into()),
            quality: Some("4k".into()),
            genre: Some("sci-fi".into()),
            minimum_rating: Some(7),
            sort_by: Some("Rating".into()),
            order_by: Some("asc".into()),
            ..filters()
        }
        .into_query()
        .unwrap();

        assert_eq!(query.quality, Some(Quality::P2160));
        assert_eq!(query.sort_by, Some(SortField::Rating));
        assert_eq!(query.order_by, Some(SortOrder::Asc));
        assert_eq!(query.minimum_rating, Some(7));
        assert_eq!((query.limit, query.page), (20, 1));
    }

    #[test]
    fn test_bad_filters_are_rejected_before_any_request() {
        let err = BrowseFilters {
            quality: Some("480p".into()),
            ..filters()
        }
        .into_query()
        .unwrap_err();
        assert!(matches!(err, Error::InvalidQuality(q) if q == "480p"));

        let err = BrowseFilters {
            sort_by: Some("popularity".into()),
            ..filters()
        }
        .into_query()
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = BrowseFilters {
            limit: 51,
            ..filters()
        }
        .into_query()
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_listing_line() {
        assert_eq!(
            listing_line(&testing::inception()),
            "#3175  Inception (2010)  ⭐ 8.8  tt1375666  [1080p]"
        );
    }

    #[tokio::test]
    async fn test_browse_lists_the_provider_page() {
        let lookup = FakeLookup::default();
        let provider = FakeProvider::serving(testing::inception());
        let (services, _) = testing::services(&lookup, &provider);

        handle_browse(&services, filters()).await.unwrap();

        let err = handle_browse(
            &services,
            BrowseFilters {
                page: 0,
                ..filters()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::Validation(_))
        ));
        assert!(lookup.calls().is_empty());
    }
}
