//! Crawl orchestration
//!
//! Drives a full crawl run for one site: claims the site, opens a history
//! record, seeds and drains the persistent queue one URL at a time, and
//! finalizes site status and run history whatever the outcome. The run
//! moves through an explicit phase machine so that bookkeeping steps cannot
//! be skipped or reordered.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_url, FetchOutcome};
use crate::crawler::frontier;
use crate::crawler::parser::parse_content;
use crate::index::index_document;
use crate::robots::fetch_robots;
use crate::state::{CancelToken, Pacer, QueueState, SiteStatus};
use crate::storage::{
    NewDocument, ProjectRecord, RunCounters, RunStatus, SiteRecord, SqliteStorage, Store,
};
use crate::url::in_scope;
use crate::{LoupeError, Result};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

/// Lifecycle phase of a crawl run
///
/// Legal transitions move forward only: Idle, Initializing, Draining,
/// Finalizing, Done. A run whose setup fails jumps from Initializing
/// straight to Finalizing so the claimed site and the open history record
/// are still released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    /// No run started yet
    Idle,
    /// Claiming the site, resetting the queue, seeding, fetching robots.txt
    Initializing,
    /// Processing queue entries until the queue or the page budget runs out
    Draining,
    /// Writing final site status and run history
    Finalizing,
    /// Run fully accounted for
    Done,
}

impl CrawlPhase {
    /// Checks whether `next` is a legal successor of this phase
    pub fn can_advance_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (CrawlPhase::Idle, CrawlPhase::Initializing)
                | (CrawlPhase::Initializing, CrawlPhase::Draining)
                | (CrawlPhase::Initializing, CrawlPhase::Finalizing)
                | (CrawlPhase::Draining, CrawlPhase::Finalizing)
                | (CrawlPhase::Finalizing, CrawlPhase::Done)
        )
    }
}

fn advance(phase: &mut CrawlPhase, next: CrawlPhase) -> Result<()> {
    if !phase.can_advance_to(next) {
        return Err(LoupeError::InvalidTransition {
            from: *phase,
            to: next,
        });
    }
    *phase = next;
    Ok(())
}

/// How the drain loop ended
enum RunEnd {
    /// Queue drained or page budget reached
    Completed,
    /// Cancellation requested between URLs
    Cancelled,
}

/// Summary of a finished crawl run
#[derive(Debug)]
pub struct CrawlReport {
    pub site_id: i64,
    pub project_id: i64,
    pub history_id: i64,
    pub counters: RunCounters,
    pub status: RunStatus,
    /// Per-URL failure messages, plus the run-level error if the run aborted
    pub errors: Vec<String>,
    pub elapsed: Duration,
}

/// Crawls one site at a time against shared storage
pub struct Crawler {
    config: Arc<Config>,
    storage: Arc<Mutex<SqliteStorage>>,
    client: reqwest::Client,
    cancel: CancelToken,
}

impl Crawler {
    /// Creates a crawler with its HTTP client built from the configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration
    /// * `storage` - Shared storage handle
    /// * `cancel` - Cancellation token polled between URLs
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to crawl
    /// * `Err(LoupeError)` - The HTTP client could not be built
    pub fn new(
        config: Arc<Config>,
        storage: Arc<Mutex<SqliteStorage>>,
        cancel: CancelToken,
    ) -> Result<Self> {
        let client = build_http_client(&config.crawler, &config.user_agent)?;
        Ok(Self {
            config,
            storage,
            client,
            cancel,
        })
    }

    /// Runs a full crawl of one site
    ///
    /// The site is claimed for the duration of the run and released into
    /// `active` (completed or cancelled) or `error` (aborted) when it ends.
    /// Every run leaves a finalized crawl_history record.
    ///
    /// # Arguments
    ///
    /// * `site_id` - The site to crawl
    /// * `max_pages` - Page budget override; defaults to the configured value
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The run was recorded, whatever its outcome;
    ///   per-URL failures are listed inside the report
    /// * `Err(LoupeError)` - The run could not start, or a bookkeeping write
    ///   failed
    pub async fn crawl_site(&self, site_id: i64, max_pages: Option<u32>) -> Result<CrawlReport> {
        let started = Instant::now();
        let mut phase = CrawlPhase::Idle;

        let (site, project) = {
            let storage = self.storage.lock().unwrap();
            let site = storage
                .get_site(site_id)?
                .ok_or_else(|| LoupeError::SiteNotFound(site_id.to_string()))?;
            let project = storage
                .get_project(site.project_id)?
                .ok_or_else(|| LoupeError::ProjectNotFound(site.project_id.to_string()))?;
            (site, project)
        };

        advance(&mut phase, CrawlPhase::Initializing)?;

        {
            let mut storage = self.storage.lock().unwrap();
            if !storage.claim_site(site_id)? {
                return Err(LoupeError::CrawlInProgress { site_id });
            }
        }

        let history_id = {
            let mut storage = self.storage.lock().unwrap();
            storage.start_history(site.project_id, site_id)?
        };

        info!(
            "Starting crawl of {} (site {}, project '{}')",
            site.base_url, site_id, project.name
        );

        let mut counters = RunCounters::default();
        let mut errors = Vec::new();

        let outcome = self
            .run_claimed(
                &site,
                &project,
                max_pages,
                &mut phase,
                &mut counters,
                &mut errors,
            )
            .await;

        advance(&mut phase, CrawlPhase::Finalizing)?;

        let (site_status, run_status, error_details) = match &outcome {
            Ok(RunEnd::Completed) => (SiteStatus::Active, RunStatus::Completed, None),
            Ok(RunEnd::Cancelled) => (SiteStatus::Active, RunStatus::Cancelled, None),
            Err(e) => (SiteStatus::Error, RunStatus::Failed, Some(e.to_string())),
        };

        {
            let mut storage = self.storage.lock().unwrap();
            storage.finish_site(site_id, site_status)?;
            storage.finalize_history(history_id, &counters, run_status, error_details.as_deref())?;
        }

        advance(&mut phase, CrawlPhase::Done)?;

        if let Err(e) = outcome {
            warn!("Crawl of site {} aborted: {}", site_id, e);
            errors.push(e.to_string());
        }

        info!(
            "Crawl of site {} finished as {:?}: {} crawled, {} indexed, {} failed, {} skipped, {} discovered in {:.1}s",
            site_id,
            run_status,
            counters.urls_crawled,
            counters.urls_successful,
            counters.urls_failed,
            counters.urls_skipped,
            counters.urls_discovered,
            started.elapsed().as_secs_f64()
        );

        Ok(CrawlReport {
            site_id,
            project_id: site.project_id,
            history_id,
            counters,
            status: run_status,
            errors,
            elapsed: started.elapsed(),
        })
    }

    /// Everything between a successful claim and finalization
    ///
    /// Errors returned here abort the run; the caller records them and still
    /// releases the site and closes the history record.
    async fn run_claimed(
        &self,
        site: &SiteRecord,
        project: &ProjectRecord,
        max_pages: Option<u32>,
        phase: &mut CrawlPhase,
        counters: &mut RunCounters,
        errors: &mut Vec<String>,
    ) -> Result<RunEnd> {
        let settings = &project.crawl_settings;
        let base_url = Url::parse(&site.base_url)?;
        let site_host = base_url.host_str().unwrap_or_default().to_string();

        {
            let mut storage = self.storage.lock().unwrap();
            let reset = storage.reset_site_queue(site.id)?;
            if reset > 0 {
                debug!("Reset {} queue entries back to pending", reset);
            }
            frontier::seed(&mut *storage, project.id, site.id, &base_url)?;
        }

        let mut pacer = Pacer::new(settings.crawl_delay);
        let robots = if settings.respect_robots {
            let rules = fetch_robots(&self.client, &base_url).await;
            if let Some(delay) = rules.crawl_delay(&self.config.user_agent.name) {
                pacer.extend_delay(delay);
                debug!("robots.txt raises the crawl delay to {:?}", pacer.delay());
            }
            Some(rules)
        } else {
            None
        };

        advance(phase, CrawlPhase::Draining)?;

        let budget = max_pages.unwrap_or(self.config.crawler.default_max_pages);
        let mut processed: u32 = 0;

        loop {
            if self.cancel.is_cancelled() {
                info!("Cancellation requested, stopping after {} URLs", processed);
                return Ok(RunEnd::Cancelled);
            }

            if processed >= budget {
                info!("Page budget of {} reached", budget);
                break;
            }

            let entry = {
                let mut storage = self.storage.lock().unwrap();
                storage.claim_next_pending(site.id)?
            };
            let entry = match entry {
                Some(entry) => entry,
                None => break,
            };

            // The budget counts dequeued entries, whatever their outcome
            processed += 1;
            counters.urls_crawled += 1;

            let already_indexed = {
                let storage = self.storage.lock().unwrap();
                storage.document_exists(&entry.url_hash)?
            };
            if already_indexed {
                let mut storage = self.storage.lock().unwrap();
                storage.mark_queue_entry(
                    entry.id,
                    QueueState::Skipped,
                    Some("URL already indexed"),
                )?;
                counters.urls_skipped += 1;
                continue;
            }

            if let Some(rules) = &robots {
                if !rules.is_allowed(&entry.url, &self.config.user_agent.name) {
                    debug!("robots.txt disallows {}", entry.url);
                    let mut storage = self.storage.lock().unwrap();
                    storage.mark_queue_entry(
                        entry.id,
                        QueueState::Failed,
                        Some("Disallowed by robots.txt"),
                    )?;
                    counters.urls_failed += 1;
                    continue;
                }
            }

            if let Some(wait) = pacer.time_until_next(Instant::now()) {
                tokio::time::sleep(wait).await;
            }
            pacer.record_request(Instant::now());

            debug!("Fetching {} (depth {})", entry.url, entry.depth);
            let outcome = fetch_url(
                &self.client,
                &entry.url,
                self.config.crawler.max_content_length,
            )
            .await;

            let (content_type, body) = match outcome {
                FetchOutcome::Success {
                    content_type, body, ..
                } => (content_type, body),
                other => {
                    let message = other
                        .error_message()
                        .unwrap_or_else(|| "Fetch failed".to_string());
                    warn!("Fetch of {} failed: {}", entry.url, message);
                    errors.push(format!("{}: {}", entry.url, message));
                    let mut storage = self.storage.lock().unwrap();
                    storage.mark_queue_entry(entry.id, QueueState::Failed, Some(&message))?;
                    counters.urls_failed += 1;
                    continue;
                }
            };

            let page_url = Url::parse(&entry.url)?;
            let parsed = match parse_content(
                &content_type,
                &body,
                &page_url,
                self.config.crawler.max_links_per_page,
            ) {
                Some(parsed) => parsed,
                None => {
                    let message = format!("Unsupported content type: {}", content_type);
                    debug!("{}: {}", entry.url, message);
                    errors.push(format!("{}: {}", entry.url, message));
                    let mut storage = self.storage.lock().unwrap();
                    storage.mark_queue_entry(entry.id, QueueState::Failed, Some(&message))?;
                    counters.urls_failed += 1;
                    continue;
                }
            };

            let doc = NewDocument {
                project_id: project.id,
                site_id: site.id,
                url: entry.url.clone(),
                url_hash: entry.url_hash.clone(),
                content_type: parsed.kind.as_str().to_string(),
                title: parsed.title.clone(),
                description: parsed.description.clone(),
                content: parsed.content.clone(),
                language: parsed.language.clone(),
                file_size: body.len() as i64,
                quality_score: parsed.quality_score,
                metadata: parsed.metadata.clone(),
            };

            let postings = {
                let mut storage = self.storage.lock().unwrap();
                let document_id = storage.insert_document(&doc)?;
                index_document(
                    &mut *storage,
                    document_id,
                    project.id,
                    parsed.title.as_deref(),
                    parsed.description.as_deref(),
                    &parsed.content,
                )?
            };

            if entry.depth < settings.max_depth {
                let mut storage = self.storage.lock().unwrap();
                for link in &parsed.links {
                    if !in_scope(link, &site_host, &project.base_domains) {
                        continue;
                    }
                    let inserted = frontier::enqueue_discovered(
                        &mut *storage,
                        project.id,
                        site.id,
                        link,
                        entry.depth,
                        &entry.url,
                    )?;
                    if inserted {
                        counters.urls_discovered += 1;
                    }
                }
            }

            {
                let mut storage = self.storage.lock().unwrap();
                storage.mark_queue_entry(entry.id, QueueState::Completed, None)?;
            }
            counters.urls_successful += 1;

            info!(
                "Indexed {} ({} postings, {} links)",
                entry.url,
                postings,
                parsed.links.len()
            );
        }

        Ok(RunEnd::Completed)
    }
}
