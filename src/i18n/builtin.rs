//! Built-in strings for the keys the listings and the CLI use

pub(super) const ENTRIES: &[(&str, [&str; 3])] = &[
    // [en, fr, es]
    ("loading", ["Loading from Wikidata…", "Chargement depuis Wikidata…", "Cargando desde Wikidata…"]),
    ("error.load", [
        "Failed to load data from Wikidata.",
        "Échec du chargement depuis Wikidata.",
        "Error al cargar datos de Wikidata.",
    ]),
    ("search.noResults", ["No results found for", "Aucun résultat pour", "Sin resultados para"]),
    ("search.results", ["result", "résultat", "resultado"]),
    ("search.resultsPlural", ["results", "résultats", "resultados"]),
    ("search.for", ["for", "pour", "para"]),
    ("search.tryAgain", [
        "Try a different search term, or browse using the navigation above.",
        "Essayez un autre terme ou parcourez la navigation ci-dessus.",
        "Prueba otro término o navega usando el menú de arriba.",
    ]),
    ("search.failed", [
        "Search failed. Please try again.",
        "La recherche a échoué. Veuillez réessayer.",
        "La búsqueda falló. Inténtalo de nuevo.",
    ]),
    ("search.tooShort", [
        "Type at least {n} characters to search.",
        "Saisissez au moins {n} caractères pour rechercher.",
        "Escribe al menos {n} caracteres para buscar.",
    ]),
    ("search.catCountry", ["Country / City", "Pays / Ville", "País / Ciudad"]),
    ("search.catPerson", ["Person", "Personne", "Persona"]),
    ("search.catLgbt", ["LGBT Topic", "Sujet LGBT", "Tema LGBT"]),
    ("cities.none", ["No cities found.", "Aucune ville trouvée.", "No se encontraron ciudades."]),
    ("cities.count", ["{n} cities", "{n} villes", "{n} ciudades"]),
    ("cities.records", ["{n} records", "{n} entrées", "{n} registros"]),
    ("cities.catPlaces", ["Places", "Lieux", "Lugares"]),
    ("cities.catEvents", ["Events", "Événements", "Eventos"]),
    ("cities.catOrganizations", ["Organizations", "Organisations", "Organizaciones"]),
    ("countries.none", ["No countries found.", "Aucun pays trouvé.", "No se encontraron países."]),
    ("countries.count", ["{n} countries", "{n} pays", "{n} países"]),
    ("countries.rightsItems", ["Rights items: {n}", "Éléments de droits : {n}", "Elementos de derechos: {n}"]),
    ("countries.historyItems", ["History items: {n}", "Éléments d’histoire : {n}", "Elementos de historia: {n}"]),
    ("countries.catRights", ["Rights", "Droits", "Derechos"]),
    ("countries.catHistory", ["History", "Histoire", "Historia"]),
    ("progress.sources", [
        "{done} of {total} sources loaded",
        "{done} sources chargées sur {total}",
        "{done} de {total} fuentes cargadas",
    ]),
    ("progress.partial", [
        "Some sources could not be loaded.",
        "Certaines sources n’ont pas pu être chargées.",
        "Algunas fuentes no se pudieron cargar.",
    ]),
    ("theme.switchLight", ["Switch to light theme", "Mode clair", "Modo claro"]),
    ("theme.switchDark", ["Switch to dark theme", "Mode sombre", "Modo oscuro"]),
    ("lang.label", ["Language", "Langue", "Idioma"]),
];

pub(super) const LANGS: [&str; 3] = ["en", "fr", "es"];
