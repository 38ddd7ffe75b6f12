//! Then steps for trail lifecycle BDD scenarios.

use super::world::{TrailWorld, other_caller, run_async};
use chrono::{Duration, Utc};
use rstest_bdd_macros::then;
use trails::trail::{access::Caller, domain::Trail};

fn read_as_everyone(world: &TrailWorld) -> Result<Vec<Trail>, eyre::Report> {
    let id = world.recorded()?.id();
    let mut seen = Vec::new();
    for caller in [Caller::Anonymous, other_caller(), world.caller] {
        let found = run_async(world.service.find(&caller, id))
            .map_err(|err| eyre::eyre!("find failed: {err}"))?
            .ok_or_else(|| eyre::eyre!("trail {id} not visible to {caller}"))?;
        seen.push(found);
    }
    Ok(seen)
}

#[then("the recorded trail has a generated identifier")]
fn has_generated_identifier(world: &TrailWorld) -> Result<(), eyre::Report> {
    let trail = world.recorded()?;
    if trail.id().into_inner().is_nil() {
        return Err(eyre::eyre!("expected a generated identifier"));
    }
    Ok(())
}

#[then("the recorded trail was created just now")]
fn created_just_now(world: &TrailWorld) -> Result<(), eyre::Report> {
    let trail = world.recorded()?;
    let after = world
        .recorded_after
        .ok_or_else(|| eyre::eyre!("recording time was not captured"))?;
    let created = trail.created_at();
    if created < after || created > Utc::now() + Duration::seconds(1) {
        return Err(eyre::eyre!("created_at {created} is not close to now"));
    }
    Ok(())
}

#[then("the recorded trail has no synthesis, nodes, or edges")]
fn has_no_optional_fields(world: &TrailWorld) -> Result<(), eyre::Report> {
    let trail = world.recorded()?;
    if trail.synthesis().is_some() || trail.nodes().is_some() || trail.edges().is_some() {
        return Err(eyre::eyre!("expected empty optional fields, got {trail:?}"));
    }
    Ok(())
}

#[then(r#"any caller reading the trail sees synthesis "{synthesis}""#)]
fn everyone_sees_synthesis(world: &TrailWorld, synthesis: String) -> Result<(), eyre::Report> {
    for trail in read_as_everyone(world)? {
        if trail.synthesis() != Some(synthesis.as_str()) {
            return Err(eyre::eyre!(
                "expected synthesis '{synthesis}', got {:?}",
                trail.synthesis()
            ));
        }
    }
    Ok(())
}

#[then("any caller reading the trail sees {count:usize} nodes")]
fn everyone_sees_nodes(world: &TrailWorld, count: usize) -> Result<(), eyre::Report> {
    for trail in read_as_everyone(world)? {
        let seen = trail
            .nodes()
            .and_then(|payload| payload.as_value().as_array())
            .map_or(0, Vec::len);
        if seen != count {
            return Err(eyre::eyre!("expected {count} nodes, found {seen}"));
        }
    }
    Ok(())
}

#[then(r#"the listing starts with "{query}""#)]
fn listing_starts_with(world: &TrailWorld, query: String) -> Result<(), eyre::Report> {
    let listing = world
        .last_listing
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no listing captured"))?;
    let first = listing
        .first()
        .ok_or_else(|| eyre::eyre!("listing is empty"))?;
    if first.query() != query {
        return Err(eyre::eyre!("expected '{query}' first, got '{}'", first.query()));
    }
    Ok(())
}

#[then("the listing contains {count:usize} trails")]
fn listing_contains(world: &TrailWorld, count: usize) -> Result<(), eyre::Report> {
    let listing = world
        .last_listing
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no listing captured"))?;
    if listing.len() != count {
        return Err(eyre::eyre!("expected {count} trails, found {}", listing.len()));
    }
    Ok(())
}

#[then("the trail can no longer be found")]
fn trail_is_gone(world: &TrailWorld) -> Result<(), eyre::Report> {
    let id = world.recorded()?.id();
    let found = run_async(world.service.find(&Caller::Anonymous, id))
        .map_err(|err| eyre::eyre!("find failed: {err}"))?;
    if found.is_some() {
        return Err(eyre::eyre!("expected trail {id} to be deleted"));
    }
    Ok(())
}
