use crate::client::config::ClientConfig;
use crate::client::models::app_state::{AppState, Route};
use crate::client::models::commands::{parse_command, Command, HELP};
use crate::client::models::composer::Composer;
use crate::client::models::listing::{Listing, Paginator};
use crate::client::services::api::{ApiClient, ApiService};
use crate::client::services::auth_service;
use crate::client::services::chat_service::{ChatService, ChatUpdate};
use crate::client::services::message_parser::format_message_line;
use crate::client::utils::session_store::SessionStore;
use crate::client::utils::validation::{CompanyForm, JobForm, LoginForm, RegisterForm};
use crate::common::models::{Application, ChatMessage, Company, Conversation, Job, Role, Session};
use anyhow::anyhow;
use log::{info, warn};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{sleep_until, Duration, Instant};

/// Terminal front end: one screen at a time, driven by slash commands.
pub struct CliClient {
    api: Arc<ApiClient>,
    state: AppState,
    chat: ChatService,
    composer: Composer,
    jobs: Listing<Job>,
    paginator: Paginator,
    companies: Listing<Company>,
    applicants: Listing<Application>,
    conversations: Vec<Conversation>,
}

impl CliClient {
    pub fn new(config: &ClientConfig) -> Self {
        let api = Arc::new(ApiClient::new(config.api_base_url.clone(), config.http_timeout));
        let store = if config.keyring_fallback {
            SessionStore::keyring(Some(config.session_file.clone()))
        } else {
            SessionStore::keyring(None)
        };
        let state = AppState::init(store);
        api.set_token(state.token().map(str::to_string));
        let chat = ChatService::new(api.clone(), config.websocket_url.clone(), config.typing_idle);
        Self {
            api,
            state,
            chat,
            composer: Composer::new(),
            jobs: Listing::default(),
            paginator: Paginator::default(),
            companies: Listing::default(),
            applicants: Listing::default(),
            conversations: Vec::new(),
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut events = self
            .chat
            .take_events()
            .ok_or_else(|| anyhow!("connection events already taken"))?;
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        println!("[CLIENT] Welcome! Type /help for the list of commands.");
        if let Some(session) = self.state.session().cloned() {
            println!("[CLIENT] Restored session for {} ({})", session.user.name, session.user.role);
        }
        if let Some(route) = auth_service::restore(self.api.as_ref(), &mut self.state).await {
            self.after_auth(route).await;
        }

        loop {
            let deadline = self.chat.typing_deadline();
            tokio::select! {
                line = lines.next_line() => {
                    match line? {
                        Some(line) => {
                            if !self.handle_line(&line).await {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                Some(event) = events.recv() => {
                    let update = self.chat.handle_event(event);
                    self.render_update(update);
                }
                _ = sleep_until(deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600))), if deadline.is_some() => {
                    if let Some(session) = self.state.session().cloned() {
                        self.chat.tick(&session);
                    }
                }
            }
        }

        if let Some(session) = self.state.session().cloned() {
            self.chat.disconnect(&session);
        }
        println!("[CLIENT] Bye.");
        Ok(())
    }

    /// Returns false when the user asked to quit.
    async fn handle_line(&mut self, line: &str) -> bool {
        match parse_command(line) {
            Ok(Some(Command::Quit)) => false,
            Ok(Some(cmd)) => {
                self.dispatch(cmd).await;
                true
            }
            Ok(None) => true,
            Err(e) => {
                println!("[CLIENT] {}", e);
                true
            }
        }
    }

    fn require_session(&self) -> Option<Session> {
        let session = self.state.session().cloned();
        if session.is_none() {
            println!("[CLIENT] You must log in first!");
        }
        session
    }

    async fn dispatch(&mut self, cmd: Command) {
        match cmd {
            Command::Help => println!("{}", HELP),
            Command::Register { name, email, password, role } => {
                let form = RegisterForm { name, email, password, role };
                match auth_service::register(self.api.as_ref(), &mut self.state, &form).await {
                    Ok(route) => self.after_auth(route).await,
                    Err(e) => println!("[CLIENT] Registration failed: {}", e),
                }
            }
            Command::Login { email, password, role } => {
                let form = LoginForm { email, password, role };
                match auth_service::login(self.api.as_ref(), &mut self.state, &form).await {
                    Ok(route) => self.after_auth(route).await,
                    Err(e) => println!("[CLIENT] Login failed: {}", e),
                }
            }
            Command::Logout => {
                if let Some(session) = self.state.session().cloned() {
                    self.chat.close_conversation(&session);
                }
                auth_service::logout(self.api.as_ref(), &mut self.state, self.chat.connection_mut());
                self.conversations.clear();
                println!("[CLIENT] Logged out.");
            }
            Command::WhoAmI => match self.state.user() {
                Some(u) => println!("[CLIENT] {} <{}> as {} ({:?})", u.name, u.email, u.role, self.state.route()),
                None => println!("[CLIENT] Not logged in."),
            },
            Command::Jobs { page } => self.load_jobs(page.unwrap_or(1)).await,
            Command::NextPage => {
                let page = self.paginator.next();
                self.load_jobs(page).await;
            }
            Command::PrevPage => {
                let page = self.paginator.prev();
                self.load_jobs(page).await;
            }
            Command::Job { id } => match self.api.get_job(&id).await {
                Ok(job) => {
                    println!("{} [{}]", job.title, job.id);
                    println!("  {}", job.description);
                    if let Some(loc) = &job.location {
                        println!("  Location: {}", loc);
                    }
                    if let Some(salary) = job.salary {
                        println!("  Salary: {:.0}", salary);
                    }
                }
                Err(e) => println!("[CLIENT] Could not load job: {}", e),
            },
            Command::PostJob { title, description } => self.post_job(title, description).await,
            Command::DeleteJob { id } => {
                if self.require_role(&[Role::Recruiter, Role::Admin]).is_none() {
                    return;
                }
                let api = self.api.clone();
                match self.jobs.delete_with(&id, || api.delete_job(&id)).await {
                    Ok(()) => println!("[CLIENT] Job {} deleted ({} left on this page).", id, self.jobs.len()),
                    Err(e) => println!("[CLIENT] Delete failed: {}", e),
                }
            }
            Command::Apply { job_id, cover_letter } => {
                if self.require_role(&[Role::Candidate]).is_none() {
                    return;
                }
                match self.api.apply_to_job(&job_id, cover_letter.as_deref()).await {
                    Ok(app) => println!("[CLIENT] Applied to {} ({:?}).", app.job_id, app.status),
                    Err(e) => println!("[CLIENT] Application failed: {}", e),
                }
            }
            Command::Applicants { job_id } => {
                if self.require_role(&[Role::Recruiter]).is_none() {
                    return;
                }
                match self.api.applications_for_job(&job_id).await {
                    Ok(apps) => {
                        self.applicants.replace(apps);
                        if self.applicants.is_empty() {
                            println!("[CLIENT] No applicants yet.");
                        }
                        for a in self.applicants.items() {
                            println!("  {} candidate={} status={:?}", a.id, a.candidate_id, a.status);
                        }
                    }
                    Err(e) => println!("[CLIENT] Could not load applicants: {}", e),
                }
            }
            Command::Status { application_id, status } => {
                if self.require_role(&[Role::Recruiter]).is_none() {
                    return;
                }
                match self.api.update_application_status(&application_id, status).await {
                    Ok(app) => {
                        println!("[CLIENT] Application {} is now {:?}.", app.id, app.status);
                        if let Some(shown) = self.applicants.get_mut(&app.id) {
                            *shown = app;
                        }
                    }
                    Err(e) => println!("[CLIENT] Status update failed: {}", e),
                }
            }
            Command::Companies => match self.api.list_companies().await {
                Ok(companies) => {
                    self.companies.replace(companies);
                    for c in self.companies.items() {
                        println!("  {} [{}]", c.name, c.id);
                    }
                }
                Err(e) => println!("[CLIENT] Could not load companies: {}", e),
            },
            Command::RegisterCompany { name, website } => {
                if self.require_role(&[Role::Recruiter]).is_none() {
                    return;
                }
                let form = CompanyForm { name, description: None, website, location: None };
                if let Err(e) = form.validate() {
                    println!("[CLIENT] {}", e);
                    return;
                }
                match self.api.create_company(&form).await {
                    Ok(c) => {
                        self.state.navigate(Route::RecruiterHome);
                        println!("[CLIENT] Company {} registered.", c.name);
                    }
                    Err(e) => println!("[CLIENT] Company registration failed: {}", e),
                }
            }
            Command::DeleteCompany { id } => {
                if self.require_role(&[Role::Recruiter, Role::Admin]).is_none() {
                    return;
                }
                let api = self.api.clone();
                match self.companies.delete_with(&id, || api.delete_company(&id)).await {
                    Ok(()) => println!("[CLIENT] Company {} deleted.", id),
                    Err(e) => println!("[CLIENT] Delete failed: {}", e),
                }
            }
            Command::Notifications => {
                let Some(session) = self.require_session() else { return };
                match self.api.list_notifications(&session.user.id).await {
                    Ok(list) if list.is_empty() => println!("[CLIENT] No notifications."),
                    Ok(list) => {
                        for n in list {
                            let unread = if n.read { " " } else { "*" };
                            println!(" {} {} {}", unread, n.id, n.text);
                            if !n.read {
                                if let Err(e) = self.api.mark_notification_read(&n.id).await {
                                    warn!("[CLIENT] Could not mark notification {} read: {}", n.id, e);
                                }
                            }
                        }
                    }
                    Err(e) => println!("[CLIENT] Could not load notifications: {}", e),
                }
            }
            Command::Conversations => {
                let Some(session) = self.require_session() else { return };
                self.refresh_conversations(&session).await;
                for c in &self.conversations {
                    let peer = c.other_member(&session.user.id).unwrap_or("?");
                    println!("  {} with {}", c.id, peer);
                }
            }
            Command::ChatWith { user_id } => {
                let Some(session) = self.require_session() else { return };
                match self.api.create_conversation(&session.user.id, &user_id).await {
                    Ok(conversation) => self.open(&session, conversation).await,
                    Err(e) => println!("[CLIENT] Could not start conversation: {}", e),
                }
            }
            Command::Open { conversation_id } => {
                let Some(session) = self.require_session() else { return };
                if !self.conversations.iter().any(|c| c.id == conversation_id) {
                    self.refresh_conversations(&session).await;
                }
                match self.conversations.iter().find(|c| c.id == conversation_id).cloned() {
                    Some(conversation) => self.open(&session, conversation).await,
                    None => println!("[CLIENT] Unknown conversation {}", conversation_id),
                }
            }
            Command::Close => {
                let Some(session) = self.require_session() else { return };
                self.chat.close_conversation(&session);
                self.composer.clear();
                println!("[CLIENT] Conversation closed.");
            }
            Command::Read { message_id } => {
                if !self.chat.mark_read(&message_id).await {
                    println!("[CLIENT] Could not mark {} read.", message_id);
                }
            }
            Command::Say(text) => {
                let Some(session) = self.require_session() else { return };
                if self.chat.view().conversation_id().is_none() {
                    println!("[CLIENT] Open a conversation first (/chat <user> or /open <id>).");
                    return;
                }
                if !self.chat.is_connected() {
                    if let Err(e) = self.chat.connect(&session).await {
                        println!("[CLIENT] Not connected: {}", e);
                        return;
                    }
                }
                self.chat.on_input(&session);
                self.composer.set(text);
                if let Err(e) = self.chat.submit(&session, &mut self.composer) {
                    println!("[CLIENT] Message not sent: {}", e);
                }
            }
            Command::Quit => {}
        }
    }

    fn require_role(&self, roles: &[Role]) -> Option<Session> {
        let session = self.require_session()?;
        if roles.contains(&session.user.role) {
            Some(session)
        } else {
            println!("[CLIENT] Not available for the {} role.", session.user.role);
            None
        }
    }

    async fn after_auth(&mut self, route: Route) {
        let Some(session) = self.state.session().cloned() else { return };
        println!("[CLIENT] Welcome {}!", session.user.name);
        match route {
            Route::CompanyRegistration => println!("[CLIENT] Register your company: /register_company <name> [website]"),
            Route::RecruiterHome => println!("[CLIENT] Recruiter home: /post_job, /jobs, /applicants, /status"),
            Route::CandidateHome => println!("[CLIENT] Browse jobs with /jobs"),
            Route::AdminDashboard => println!("[CLIENT] Admin: /companies, /jobs, /delete_job, /delete_company"),
            Route::Login => {}
        }
        if let Err(e) = self.chat.connect(&session).await {
            warn!("[CLIENT] Real-time connection unavailable: {}", e);
        }
    }

    async fn load_jobs(&mut self, page: u32) {
        match self.api.list_jobs(page).await {
            Ok(result) => {
                self.paginator = Paginator::new(result.page, result.total_pages);
                self.jobs.replace(result.items);
                if self.jobs.is_empty() {
                    println!("[CLIENT] No jobs found.");
                }
                for j in self.jobs.items() {
                    println!("  {} [{}] {}", j.title, j.id, j.location.as_deref().unwrap_or(""));
                }
                let footer = self.paginator.render();
                if !footer.is_empty() {
                    println!("{}", footer);
                }
            }
            Err(e) => println!("[CLIENT] Could not load jobs: {}", e),
        }
    }

    async fn post_job(&mut self, title: String, description: String) {
        let Some(session) = self.require_role(&[Role::Recruiter]) else { return };
        let form = JobForm { title, description, location: None, salary: None, job_type: None };
        if let Err(e) = form.validate() {
            println!("[CLIENT] {}", e);
            return;
        }
        let company = match self.api.company_for_recruiter(&session.user.id).await {
            Ok(Some(c)) => c,
            Ok(None) => {
                self.state.navigate(Route::CompanyRegistration);
                println!("[CLIENT] Register a company before posting jobs.");
                return;
            }
            Err(e) => {
                println!("[CLIENT] Company lookup failed: {}", e);
                return;
            }
        };
        match self.api.create_job(&company.id, &form).await {
            Ok(job) => println!("[CLIENT] Posted {} [{}].", job.title, job.id),
            Err(e) => println!("[CLIENT] Could not post job: {}", e),
        }
    }

    async fn refresh_conversations(&mut self, session: &Session) {
        match self.api.list_conversations(&session.user.id).await {
            Ok(list) => self.conversations = list,
            Err(e) => println!("[CLIENT] Could not load conversations: {}", e),
        }
    }

    async fn open(&mut self, session: &Session, conversation: Conversation) {
        let peer = conversation.other_member(&session.user.id).unwrap_or("?").to_string();
        let result = self.chat.open_conversation(session, conversation).await;
        println!("[CLIENT] Chat with {}", peer);
        for m in self.chat.view().messages() {
            println!("{}", self.label(m, session));
        }
        if let Err(e) = result {
            println!("[CLIENT] Live updates unavailable: {}", e);
        }
        info!("[CLIENT] Conversation view ready");
    }

    fn label(&self, message: &ChatMessage, session: &Session) -> String {
        let who = if message.sender_id == session.user.id { "you" } else { message.sender_id.as_str() };
        format_message_line(message, who)
    }

    fn render_update(&self, update: ChatUpdate) {
        let Some(session) = self.state.session() else { return };
        match update {
            ChatUpdate::Message(m) => println!("{}", self.label(&m, session)),
            ChatUpdate::Typing(Some(name)) => println!("[CHAT] {} is typing...", name),
            ChatUpdate::Typing(None) => {}
            ChatUpdate::OnlineUsers(users) => info!("[CHAT] Online: {}", users.join(", ")),
            ChatUpdate::Notification(n) => println!("[NOTIFICATION] {}", n.text),
            ChatUpdate::ServerError(e) => println!("[CHAT] Server error: {}", e),
            ChatUpdate::Disconnected => println!("[CHAT] Disconnected; the next message will reconnect."),
            ChatUpdate::Nothing => {}
        }
    }
}
