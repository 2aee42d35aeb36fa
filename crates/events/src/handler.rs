/// Execute an aggregate command deterministically (no IO, no async).
///
/// The canonical event-sourced lifecycle in one step:
///
/// 1. **Decide**: `aggregate.handle(command)` returns events (pure).
/// 2. **Evolve**: each event is applied via `aggregate.apply(event)`.
///
/// Mutates the aggregate in place. Useful for tests and inline command
/// processing that needs neither persistence nor publication; the host
/// platform's dispatcher owns the full pipeline in production.
pub fn execute<A>(aggregate: &mut A, command: &A::Command) -> Result<Vec<A::Event>, A::Error>
where
    A: motorlot_core::Aggregate,
{
    let events = A::handle(aggregate, command)?;
    for ev in &events {
        A::apply(aggregate, ev);
    }
    Ok(events)
}
