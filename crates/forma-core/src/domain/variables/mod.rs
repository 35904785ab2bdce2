//! Placeholder grammar and substitution.
//!
//! ```text
//! text --VariableTokenizer--> TokenStream --SubstitutionEngine--> Substituted
//!                                                 |
//!                       SubstitutionContext (values, NamingFacts, UuidCache)
//! ```

pub mod context;
pub mod facts;
pub mod substitution;
pub mod token;
pub mod tokenizer;
pub mod transform;

pub use context::{OptionValues, SubstitutionContext, UuidCache};
pub use facts::{NamingFacts, NamingFactsBuilder};
pub use substitution::{Substituted, SubstitutionDiagnostic, SubstitutionEngine};
pub use token::{DELIMITER, Token, TokenStream, TokenView, VariableToken};
pub use tokenizer::{OPTION_PREFIX, UUID_PREFIX, VariableTokenizer, tokenize};
pub use transform::{Transform, TransformRegistry};
