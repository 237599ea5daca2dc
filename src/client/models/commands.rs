use crate::common::models::{ApplicationStatus, Role};

/// A line typed into the terminal client.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Register { name: String, email: String, password: String, role: Role },
    Login { email: String, password: String, role: Role },
    Logout,
    WhoAmI,
    Jobs { page: Option<u32> },
    NextPage,
    PrevPage,
    Job { id: String },
    PostJob { title: String, description: String },
    DeleteJob { id: String },
    Apply { job_id: String, cover_letter: Option<String> },
    Applicants { job_id: String },
    /// Accept or reject an application to one of the recruiter's jobs.
    Status { application_id: String, status: ApplicationStatus },
    Companies,
    RegisterCompany { name: String, website: Option<String> },
    DeleteCompany { id: String },
    Notifications,
    Conversations,
    /// Start (or reopen) the conversation with another user.
    ChatWith { user_id: String },
    Open { conversation_id: String },
    Close,
    Read { message_id: String },
    Help,
    Quit,
    /// Plain text for the open conversation.
    Say(String),
}

pub const HELP: &str = "\
/register <name> <email> <password> <candidate|recruiter>
/login <email> <password> <candidate|recruiter|admin>
/logout  /whoami  /quit
/jobs [page]  /next  /prev  /job <id>
/post_job <title> | <description>     (recruiter)
/delete_job <id>                      (recruiter, admin)
/apply <job_id> [cover letter]        (candidate)
/applicants <job_id>                  (recruiter)
/status <application_id> <accepted|rejected>   (recruiter)
/companies  /register_company <name> [website]  /delete_company <id>
/notifications  /conversations
/chat <user_id>  /open <conversation_id>  /close  /read <message_id>
anything else is sent to the open conversation";

fn role_arg(arg: Option<&&str>) -> Result<Role, String> {
    arg.ok_or_else(|| "missing role".to_string())?.parse()
}

fn status_arg(arg: &str) -> Result<ApplicationStatus, String> {
    match arg.to_ascii_lowercase().as_str() {
        "accepted" | "accept" => Ok(ApplicationStatus::Accepted),
        "rejected" | "reject" => Ok(ApplicationStatus::Rejected),
        other => Err(format!("invalid status '{}' (accepted or rejected)", other)),
    }
}

fn one(args: &[&str], usage: &str) -> Result<String, String> {
    match args {
        [id] => Ok(id.to_string()),
        _ => Err(format!("usage: {}", usage)),
    }
}

/// Parse an input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Ok(None);
    }
    if !line.starts_with('/') {
        return Ok(Some(Command::Say(line.to_string())));
    }

    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or("");
    let args: Vec<&str> = parts.collect();
    let rest = line[command.len()..].trim();

    let cmd = match command {
        "/register" => match args.as_slice() {
            [name, email, password, ..] => Command::Register {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
                role: role_arg(args.get(3))?,
            },
            _ => return Err("usage: /register <name> <email> <password> <role>".into()),
        },
        "/login" => match args.as_slice() {
            [email, password, ..] => Command::Login {
                email: email.to_string(),
                password: password.to_string(),
                role: role_arg(args.get(2))?,
            },
            _ => return Err("usage: /login <email> <password> <role>".into()),
        },
        "/logout" => Command::Logout,
        "/whoami" => Command::WhoAmI,
        "/jobs" => Command::Jobs {
            page: match args.first() {
                Some(p) => Some(p.parse().map_err(|_| format!("invalid page '{}'", p))?),
                None => None,
            },
        },
        "/next" => Command::NextPage,
        "/prev" => Command::PrevPage,
        "/job" => Command::Job { id: one(&args, "/job <id>")? },
        "/post_job" => match rest.split_once('|') {
            Some((title, description)) => Command::PostJob {
                title: title.trim().to_string(),
                description: description.trim().to_string(),
            },
            None => return Err("usage: /post_job <title> | <description>".into()),
        },
        "/delete_job" => Command::DeleteJob { id: one(&args, "/delete_job <id>")? },
        "/apply" => match args.split_first() {
            Some((job_id, letter)) => Command::Apply {
                job_id: job_id.to_string(),
                cover_letter: if letter.is_empty() { None } else { Some(letter.join(" ")) },
            },
            None => return Err("usage: /apply <job_id> [cover letter]".into()),
        },
        "/applicants" => Command::Applicants { job_id: one(&args, "/applicants <job_id>")? },
        "/status" => match args.as_slice() {
            [application_id, status] => Command::Status {
                application_id: application_id.to_string(),
                status: status_arg(status)?,
            },
            _ => return Err("usage: /status <application_id> <accepted|rejected>".into()),
        },
        "/companies" => Command::Companies,
        "/register_company" => match args.as_slice() {
            [name] => Command::RegisterCompany { name: name.to_string(), website: None },
            [name, website] => Command::RegisterCompany { name: name.to_string(), website: Some(website.to_string()) },
            _ => return Err("usage: /register_company <name> [website]".into()),
        },
        "/delete_company" => Command::DeleteCompany { id: one(&args, "/delete_company <id>")? },
        "/notifications" => Command::Notifications,
        "/conversations" => Command::Conversations,
        "/chat" => Command::ChatWith { user_id: one(&args, "/chat <user_id>")? },
        "/open" => Command::Open { conversation_id: one(&args, "/open <conversation_id>")? },
        "/close" => Command::Close,
        "/read" => Command::Read { message_id: one(&args, "/read <message_id>")? },
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        other => return Err(format!("unknown command {} (try /help)", other)),
    };
    Ok(Some(cmd))
}
