//! アプリケーション本体
//!
//! Owns every piece of runtime state (active backend, snapshot
//! repository, learning session, auth) and exposes intent-level
//! operations to the presentation layer. No globals: everything hangs
//! off one `App` value.

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::export;
use crate::lookup;
use crate::models::{BookId, Plan, QuestionDirection, Word, Wordbook};
use crate::repo::WordbookRepository;
use crate::session::{Advance, Answer, CardView, LearningSession};
use crate::store::{migrate, LocalStore, RemoteStore, Store};

#[derive(Debug, Clone)]
struct AuthState {
    user_id: String,
    plan: Plan,
}

/// What happened at login, beyond switching backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Done,
    /// Guest data exists on the device; ask the user whether to merge it
    /// into the account, then call [`App::resolve_merge`].
    MergePrompt,
}

pub struct App {
    local: LocalStore,
    store: Store,
    repo: WordbookRepository,
    session: Option<LearningSession>,
    auth: Option<AuthState>,
    direction: QuestionDirection,
    api_base_url: String,
    merge_pending: bool,
}

impl App {
    /// Starts in guest mode; call [`App::load`] before first use.
    pub fn new(config: &Config) -> Self {
        let local = LocalStore::new(&config.data_dir);
        Self {
            store: Store::Local(local.clone()),
            local,
            repo: WordbookRepository::new(),
            session: None,
            auth: None,
            direction: QuestionDirection::default(),
            api_base_url: config.api_base_url.clone(),
            merge_pending: false,
        }
    }

    pub async fn load(&mut self) {
        self.repo.load_all(&self.store).await;
    }

    pub fn wordbooks(&self) -> &[Wordbook] {
        self.repo.wordbooks()
    }

    pub fn review_list(&self) -> &[Word] {
        self.repo.review_list()
    }

    pub fn review_count(&self) -> usize {
        self.repo.review_count()
    }

    pub fn find_book(&self, id: &BookId) -> Option<&Wordbook> {
        self.repo.find_book(id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.auth.as_ref().map(|auth| auth.user_id.as_str())
    }

    pub fn plan(&self) -> Plan {
        self.auth.as_ref().map(|auth| auth.plan).unwrap_or_default()
    }

    pub fn direction(&self) -> QuestionDirection {
        self.direction
    }

    /// Latched by the next session start; an active session keeps the
    /// direction it started with.
    pub fn set_direction(&mut self, direction: QuestionDirection) {
        self.direction = direction;
    }

    // ---- wordbook and word management ----

    pub async fn create_wordbook(&mut self, name: &str) -> AppResult<BookId> {
        let plan = self.plan();
        let authenticated = self.is_authenticated();
        self.repo
            .create_wordbook(&self.store, name, plan, authenticated)
            .await
    }

    pub async fn delete_wordbook(&mut self, id: &BookId) -> AppResult<()> {
        self.repo.delete_wordbook(&self.store, id).await
    }

    pub async fn add_word(&mut self, id: &BookId, en: &str, jp: &str) -> AppResult<()> {
        self.repo.add_word(&self.store, id, en, jp).await
    }

    pub async fn edit_word(&mut self, id: &BookId, en: &str, new_jp: &str) -> AppResult<()> {
        self.repo.edit_word(&self.store, id, en, new_jp).await
    }

    pub async fn delete_word(&mut self, id: &BookId, en: &str) -> AppResult<()> {
        self.repo.delete_word(&self.store, id, en).await
    }

    // ---- learning sessions ----

    /// Starts a normal session over one wordbook. A stale id is a real
    /// error here, unlike repository mutations.
    pub fn start_session(&mut self, id: &BookId) -> AppResult<()> {
        let Some(book) = self.repo.find_book(id) else {
            return Err(AppError::not_found("単語帳が見つかりません。"));
        };
        let session =
            LearningSession::start(&book.words, self.direction, false, Some(id.clone()))?;
        self.session = Some(session);
        Ok(())
    }

    /// Starts a review session over the whole review list.
    pub fn start_review(&mut self) -> AppResult<()> {
        if self.repo.review_list().is_empty() {
            return Err(AppError::validation("復習する単語がありません。"));
        }
        let session =
            LearningSession::start(self.repo.review_list(), self.direction, true, None)?;
        self.session = Some(session);
        Ok(())
    }

    pub fn in_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn card(&self) -> Option<CardView> {
        self.session.as_ref().and_then(|s| s.current_card())
    }

    /// Answers the current card. On completion the outcome is reconciled
    /// into the review list (and source book) before returning.
    pub async fn answer(&mut self, kind: Answer) -> AppResult<Advance> {
        let Some(session) = self.session.as_mut() else {
            return Err(AppError::validation("学習セッションが開始されていません。"));
        };
        let advance = session.answer(kind);
        if let Advance::Finished(outcome) = &advance {
            self.repo.apply_outcome(&self.store, outcome).await?;
            self.session = None;
        }
        Ok(advance)
    }

    /// Abandons the session. Nothing is reconciled; answers given so far
    /// are discarded.
    pub fn stop_session(&mut self) {
        self.session = None;
    }

    // ---- authentication and backend switching ----

    /// Switches to the remote backend for `user_id`. Plan lookup fails
    /// soft to the free plan. When guest data exists on the device the
    /// caller must follow up with [`App::resolve_merge`].
    pub async fn login(&mut self, user_id: &str) -> AppResult<LoginOutcome> {
        let remote = RemoteStore::new(&self.api_base_url, user_id)?;
        let plan = match remote.fetch_plan().await {
            Ok(plan) => plan,
            Err(err) => {
                tracing::warn!(error = %err, "plan lookup failed, assuming free");
                Plan::default()
            }
        };

        self.session = None;
        self.store = Store::Remote(remote);
        self.auth = Some(AuthState {
            user_id: user_id.to_string(),
            plan,
        });
        self.repo.load_all(&self.store).await;

        if self.local.has_data() {
            self.merge_pending = true;
            Ok(LoginOutcome::MergePrompt)
        } else {
            self.merge_pending = false;
            Ok(LoginOutcome::Done)
        }
    }

    /// Answers the merge prompt. Declining leaves guest data on the
    /// device untouched. Returns how many wordbooks were migrated.
    pub async fn resolve_merge(&mut self, accept: bool) -> AppResult<usize> {
        if !self.merge_pending {
            return Ok(0);
        }
        self.merge_pending = false;
        if !accept {
            return Ok(0);
        }

        let Store::Remote(remote) = &self.store else {
            return Ok(0);
        };
        let migrated = migrate::merge_into_remote(&self.local, remote).await?;
        self.repo.load_all(&self.store).await;
        Ok(migrated)
    }

    /// Back to guest mode and the device-local data.
    pub async fn logout(&mut self) {
        self.session = None;
        self.auth = None;
        self.merge_pending = false;
        self.store = Store::Local(self.local.clone());
        self.repo.load_all(&self.store).await;
    }

    // ---- guest data portability ----

    pub fn export_data(&self) -> AppResult<String> {
        if self.is_authenticated() {
            return Err(AppError::validation(
                "エクスポートはゲストモードでのみ利用できます。",
            ));
        }
        export::export_json(self.repo.wordbooks(), self.repo.review_list())
    }

    /// Replaces all guest data with the imported bundle.
    pub async fn import_data(&mut self, raw: &str) -> AppResult<()> {
        if self.is_authenticated() {
            return Err(AppError::validation(
                "インポートはゲストモードでのみ利用できます。",
            ));
        }
        let (books, review) = export::parse_import(raw)?;
        self.local
            .replace_all(&books, &review)
            .map_err(AppError::Backend)?;
        self.repo.load_all(&self.store).await;
        Ok(())
    }

    // ---- external lookup ----

    pub fn lookup_url(&self, query: &str) -> Option<String> {
        lookup::translate_url(query)
    }
}
