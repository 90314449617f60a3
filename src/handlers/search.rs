use super::{Services, candidate_label, choose_movie, with_spinner};
use crate::cli::{MovieSelector, MovieTarget};
use anyhow::{Context, Result};
use console::{Term, style};
use ytsdl::error::Error;
use ytsdl::metadata::MovieDetails;
use ytsdl::provider::{MovieId, ProviderMovie};

pub async fn handle_search(
    services: &Services,
    movie: MovieSelector,
    list: bool,
    fzf: bool,
    verbose: bool,
) -> Result<()> {
    let term = Term::stdout();
    let target = movie
        .target()
        .context("One of --imdb-id, --movieid or --movie-name is required")?;

    match target {
        MovieTarget::Title(title) => {
            term.write_line(&format!(
                "{} Searching for movies matching: '{}'",
                style("🔍").cyan(),
                style(&title).cyan().bold()
            ))?;

            let records = with_spinner(
                format!("Querying {}...", services.lookup.name()),
                services.lookup.search_by_title(&title),
            )
            .await?;

            if records.is_empty() {
                term.write_line(&format!(
                    "{} No movies found matching '{}'",
                    style("❌").red(),
                    title
                ))?;
                term.write_line(&format!(
                    "{} Try a shorter title or search by --imdb-id",
                    style("💡").yellow()
                ))?;
                return Ok(());
            }

            if list {
                term.write_line(&format!(
                    "{} Found {} match(es):",
                    style("📋").cyan(),
                    style(records.len()).green().bold()
                ))?;
                for record in &records {
                    term.write_line(&format!("   {}", candidate_label(record)))?;
                }
                return Ok(());
            }

            let chosen = if fzf {
                match choose_movie(&records)? {
                    Some(record) => record,
                    None => {
                        term.write_line(&format!("{} No movie selected", style("❌").red()))?;
                        return Ok(());
                    }
                }
            } else {
                records[0].clone()
            };

            // Two lookups per title search: the suggestions and the title page.
            show_details(services, &term, &chosen.identifier, verbose, false).await?;
            term.write_line(&format!(
                "\n{} Run 'ytsdl search --imdb-id {}' to check {}",
                style("💡").yellow(),
                chosen.identifier,
                services.provider.name()
            ))?;
            Ok(())
        }
        MovieTarget::Imdb(id) => show_details(services, &term, &id, verbose, true).await,
        MovieTarget::Provider(id) => {
            let movie = with_spinner(
                format!("Fetching {} movie #{}...", services.provider.name(), id),
                services.provider.movie(&MovieId::Provider(id)),
            )
            .await?;

            print_provider_movie(&term, services.provider.name(), &movie)
        }
    }
}

/// Print the title page, then optionally which qualities the provider carries.
///
/// A movie the provider does not list is reported, not an error.
async fn show_details(
    services: &Services,
    term: &Term,
    identifier: &str,
    verbose: bool,
    check_availability: bool,
) -> Result<()> {
    let details = with_spinner(
        format!("Fetching {} details for {}...", services.lookup.name(), identifier),
        services.lookup.get_details(identifier),
    )
    .await?;

    print_details(term, &details, verbose)?;

    if !check_availability {
        return Ok(());
    }

    let id = MovieId::Imdb(details.record.identifier.clone());
    let availability = with_spinner(
        format!("Checking {}...", services.provider.name()),
        services.provider.movie(&id),
    )
    .await;

    match availability {
        Ok(movie) => print_qualities(term, services.provider.name(), &movie),
        Err(Error::MovieNotFound(_)) => {
            term.write_line(&format!(
                "\n{} Not available on {}",
                style("❌").red(),
                services.provider.name()
            ))?;
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn print_details(term: &Term, details: &MovieDetails, verbose: bool) -> Result<()> {
    let record = &details.record;

    term.write_line(&format!(
        "\n{} {} - {}",
        style("🎬").green(),
        style(record.display_title()).cyan().bold(),
        record.identifier
    ))?;

    if let Some(rating) = record.rating {
        term.write_line(&format!("   {} Rating: {:.1}/10", style("⭐").yellow(), rating))?;
    }
    if !record.genres.is_empty() {
        term.write_line(&format!(
            "   {} Genres: {}",
            style("🏷️").dim(),
            record.genres.join(", ")
        ))?;
    }
    if !record.directors.is_empty() {
        term.write_line(&format!(
            "   {} Directed by: {}",
            style("🎥").dim(),
            record.directors.join(", ")
        ))?;
    }
    if !record.cast.is_empty() {
        let shown = if verbose {
            record.cast.len()
        } else {
            record.cast.len().min(5)
        };
        term.write_line(&format!(
            "   {} Cast: {}",
            style("👥").dim(),
            record.cast[..shown].join(", ")
        ))?;
    }

    match &details.plot {
        Some(plot) => term.write_line(&format!("   {} {}", style("📝").dim(), plot))?,
        None => term.write_line(&format!("   {} No plot available", style("📝").dim()))?,
    }

    Ok(())
}

fn print_provider_movie(term: &Term, provider: &str, movie: &ProviderMovie) -> Result<()> {
    term.write_line(&format!(
        "\n{} {} - {} #{}",
        style("🎬").green(),
        style(movie.display_title()).cyan().bold(),
        provider,
        movie.provider_id
    ))?;

    if let Some(imdb_id) = &movie.imdb_id {
        term.write_line(&format!("   {} IMDb: {}", style("🔗").dim(), imdb_id))?;
    }
    if let Some(rating) = movie.rating {
        term.write_line(&format!("   {} Rating: {:.1}/10", style("⭐").yellow(), rating))?;
    }
    if !movie.genres.is_empty() {
        term.write_line(&format!(
            "   {} Genres: {}",
            style("🏷️").dim(),
            movie.genres.join(", ")
        ))?;
    }

    print_qualities(term, provider, movie)
}

fn print_qualities(term: &Term, provider: &str, movie: &ProviderMovie) -> Result<()> {
    if movie.variants.is_empty() {
        term.write_line(&format!(
            "\n{} {} lists no torrents for this movie",
            style("❌").red(),
            provider
        ))?;
        return Ok(());
    }

    term.write_line(&format!("\n{} Available on {}:", style("📦").cyan(), provider))?;
    for variant in &movie.variants {
        let swarm = match (variant.seeds, variant.peers) {
            (Some(seeds), Some(peers)) => format!(" ({} seeds, {} peers)", seeds, peers),
            _ => String::new(),
        };
        term.write_line(&format!(
            "   • {}{}",
            style(variant.describe()).green(),
            swarm
        ))?;
    }

    Ok(())
}
