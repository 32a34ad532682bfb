use anyhow::{anyhow, Result};
use rusqlite::Connection;
use std::io::{self, BufRead, Write};

use crate::db::repository::{MetaRepo, UserRepo};
use crate::models::User;

/// The profile selected by the last `register`/`login`, if it still exists.
pub fn active_user(conn: &Connection) -> Result<Option<User>> {
    let Some(raw) = MetaRepo::get(conn, MetaRepo::ACTIVE_USER)? else {
        return Ok(None);
    };
    let Ok(id) = raw.parse::<i64>() else {
        log::warn!("ignoring malformed active user id {:?}", raw);
        return Ok(None);
    };
    Ok(UserRepo::get(conn, id)?)
}

pub fn require_user(conn: &Connection) -> Result<User> {
    active_user(conn)?.ok_or_else(|| {
        anyhow!("No active profile. Run `habitforge register` or `habitforge login <email>` first.")
    })
}

pub fn set_active(conn: &Connection, user: &User) -> Result<()> {
    MetaRepo::set(conn, MetaRepo::ACTIVE_USER, &user.id.to_string())?;
    Ok(())
}

pub fn clear_active(conn: &Connection) -> Result<()> {
    MetaRepo::remove(conn, MetaRepo::ACTIVE_USER)?;
    Ok(())
}

/// Return the active profile, asking for one on the terminal if none is set.
pub fn ensure_profile(conn: &Connection) -> Result<User> {
    if let Some(user) = active_user(conn)? {
        return Ok(user);
    }

    eprintln!("No profile found. Let's create one.");
    eprintln!();
    let email = prompt("  Email: ")?;
    if let Some(existing) = UserRepo::find_by_email(conn, &email)? {
        set_active(conn, &existing)?;
        return Ok(existing);
    }
    let name = prompt("  Name:  ")?;
    let user = UserRepo::create(conn, &name, &email)?;
    set_active(conn, &user)?;
    log::info!("created profile {} <{}>", user.name, user.email);
    Ok(user)
}

fn prompt(message: &str) -> Result<String> {
    eprint!("{}", message);
    io::stderr().flush()?;
    let mut buf = String::new();
    io::stdin().lock().read_line(&mut buf)?;
    Ok(buf.trim_end_matches('\n').trim_end_matches('\r').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn active_profile_round_trip() {
        let conn = open_in_memory().unwrap();
        assert!(active_user(&conn).unwrap().is_none());
        assert!(require_user(&conn).is_err());

        let user = UserRepo::create(&conn, "Ada", "ada@example.com").unwrap();
        set_active(&conn, &user).unwrap();
        assert_eq!(require_user(&conn).unwrap(), user);

        clear_active(&conn).unwrap();
        assert!(active_user(&conn).unwrap().is_none());
    }

    #[test]
    fn dangling_or_garbled_ids_read_as_no_profile() {
        let conn = open_in_memory().unwrap();
        MetaRepo::set(&conn, MetaRepo::ACTIVE_USER, "42").unwrap();
        assert!(active_user(&conn).unwrap().is_none());
        MetaRepo::set(&conn, MetaRepo::ACTIVE_USER, "abc").unwrap();
        assert!(active_user(&conn).unwrap().is_none());
    }
}
