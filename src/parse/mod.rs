/// Integral definition files, see [integrals::parse_one_body_def] and
/// [integrals::parse_two_body_def].
pub mod integrals;
